use std::collections::BTreeMap;

use glam::Vec3;

/// Pose adjustment an effect applies to whatever it animates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSample {
    pub offset: Vec3,
    pub rotation: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Default for EffectSample {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            rotation: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

pub trait Effect {
    /// Advances the effect and returns whether it is still running.
    fn update(&mut self, delta: f32) -> bool;

    fn sample(&self) -> EffectSample;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectHandle(u64);

/// Per-frame animations owned by the game loop.
#[derive(Default)]
pub struct EffectsScheduler {
    effects: BTreeMap<EffectHandle, Box<dyn Effect>>,
    next_id: u64,
}

impl EffectsScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, effect: impl Effect + 'static) -> EffectHandle {
        let handle = EffectHandle(self.next_id);
        self.next_id += 1;
        self.effects.insert(handle, Box::new(effect));
        handle
    }

    pub fn unregister(&mut self, handle: EffectHandle) -> bool {
        self.effects.remove(&handle).is_some()
    }

    pub fn contains(&self, handle: EffectHandle) -> bool {
        self.effects.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn sample(&self, handle: EffectHandle) -> Option<EffectSample> {
        self.effects.get(&handle).map(|effect| effect.sample())
    }

    /// Steps every effect once. Finished ones are removed and returned.
    pub fn update(&mut self, delta: f32) -> Vec<EffectHandle> {
        let mut finished = Vec::new();
        self.effects.retain(|&handle, effect| {
            let alive = effect.update(delta);
            if !alive {
                finished.push(handle);
            }
            alive
        });
        finished
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

/// Short expanding flash where a bullet struck something.
#[derive(Debug, Clone)]
pub struct ImpactEffect {
    pub position: Vec3,
    elapsed: f32,
    duration: f32,
}

impl ImpactEffect {
    pub const DURATION: f32 = 0.3;

    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            elapsed: 0.0,
            duration: Self::DURATION,
        }
    }

    fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }
}

impl Effect for ImpactEffect {
    fn update(&mut self, delta: f32) -> bool {
        self.elapsed += delta;
        self.elapsed < self.duration
    }

    fn sample(&self) -> EffectSample {
        let t = self.progress();
        EffectSample {
            scale: 1.0 + t,
            opacity: 1.0 - t,
            ..Default::default()
        }
    }
}

/// Endless spin and bob for pickups lying in the world.
#[derive(Debug, Clone)]
pub struct HoverEffect {
    elapsed: f32,
    pub spin_speed: f32,
    pub bob_height: f32,
    pub bob_frequency: f32,
}

impl Default for HoverEffect {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            spin_speed: 1.5,
            bob_height: 0.15,
            bob_frequency: 2.0,
        }
    }
}

impl Effect for HoverEffect {
    fn update(&mut self, delta: f32) -> bool {
        self.elapsed += delta;
        true
    }

    fn sample(&self) -> EffectSample {
        EffectSample {
            offset: Vec3::Y * (self.elapsed * self.bob_frequency).sin() * self.bob_height,
            rotation: self.elapsed * self.spin_speed,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impacts_finish_and_are_removed() {
        let mut scheduler = EffectsScheduler::new();
        let impact = scheduler.register(ImpactEffect::new(Vec3::ZERO));
        let hover = scheduler.register(HoverEffect::default());

        assert!(scheduler.update(0.1).is_empty());
        let sample = scheduler.sample(impact).unwrap();
        assert!(sample.opacity < 1.0 && sample.scale > 1.0);

        assert_eq!(scheduler.update(0.25), vec![impact]);
        assert!(!scheduler.contains(impact));
        assert!(scheduler.contains(hover));
    }

    #[test]
    fn unregister_is_deterministic() {
        let mut scheduler = EffectsScheduler::new();
        let hover = scheduler.register(HoverEffect::default());

        scheduler.update(0.5);
        assert!(scheduler.sample(hover).unwrap().rotation > 0.0);

        assert!(scheduler.unregister(hover));
        assert!(!scheduler.unregister(hover));
        assert!(scheduler.is_empty());
        assert!(scheduler.sample(hover).is_none());
    }
}
