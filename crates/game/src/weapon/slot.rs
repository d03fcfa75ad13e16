use super::kind::{WeaponKind, WeaponStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FireBlocked {
    #[error("no weapon in slot")]
    EmptySlot,
    #[error("weapon is cooling down")]
    Cooldown,
    #[error("weapon is reloading")]
    Reloading,
    #[error("magazine is empty")]
    MagazineEmpty,
}

/// One inventory slot. Times are in seconds on the owner's clock.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponSlot {
    pub kind: WeaponKind,
    pub bullets_in_magazine: u32,
    pub total_bullets: u32,
    pub is_reloading: bool,
    pub reload_start: f64,
    pub last_shot: Option<f64>,
    stats: WeaponStats,
}

impl WeaponSlot {
    pub fn new(kind: WeaponKind) -> Self {
        let stats = kind.stats();
        Self::with_ammo(kind, stats.max_magazine_size, stats.reserve)
    }

    pub fn empty() -> Self {
        Self::new(WeaponKind::Empty)
    }

    pub fn with_ammo(kind: WeaponKind, magazine: u32, total: u32) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            bullets_in_magazine: magazine.min(stats.max_magazine_size),
            total_bullets: total,
            is_reloading: false,
            reload_start: 0.0,
            last_shot: None,
            stats,
        }
    }

    pub fn stats(&self) -> &WeaponStats {
        &self.stats
    }

    pub fn max_magazine_size(&self) -> u32 {
        self.stats.max_magazine_size
    }

    pub fn fire_rate(&self) -> f64 {
        self.stats.fire_rate
    }

    pub fn reload_duration(&self) -> f64 {
        self.stats.reload_duration
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }

    pub fn can_fire(&self, now: f64) -> Result<(), FireBlocked> {
        if self.kind.is_empty() {
            return Err(FireBlocked::EmptySlot);
        }
        if let Some(last_shot) = self.last_shot {
            if now - last_shot < self.stats.fire_rate {
                return Err(FireBlocked::Cooldown);
            }
        }
        if self.is_reloading {
            return Err(FireBlocked::Reloading);
        }
        if self.bullets_in_magazine == 0 {
            return Err(FireBlocked::MagazineEmpty);
        }
        Ok(())
    }

    /// Spends one round if the slot can fire.
    pub fn consume_round(&mut self, now: f64) -> Result<(), FireBlocked> {
        self.can_fire(now)?;
        self.bullets_in_magazine -= 1;
        self.last_shot = Some(now);
        Ok(())
    }

    pub fn start_reload(&mut self, now: f64) -> bool {
        if self.kind.is_empty()
            || self.is_reloading
            || self.bullets_in_magazine >= self.stats.max_magazine_size
            || self.total_bullets == 0
        {
            return false;
        }
        self.is_reloading = true;
        self.reload_start = now;
        true
    }

    /// Completes a pending reload once its duration has elapsed.
    pub fn poll_reload(&mut self, now: f64) -> bool {
        if !self.is_reloading || now - self.reload_start < self.stats.reload_duration {
            return false;
        }

        let deficit = self.stats.max_magazine_size - self.bullets_in_magazine;
        let moved = deficit.min(self.total_bullets);
        self.bullets_in_magazine += moved;
        self.total_bullets -= moved;
        self.is_reloading = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_checks_run_in_order() {
        assert_eq!(WeaponSlot::empty().can_fire(0.0), Err(FireBlocked::EmptySlot));

        let mut pistol = WeaponSlot::new(WeaponKind::Pistol);
        assert!(pistol.consume_round(1.0).is_ok());
        assert_eq!(pistol.can_fire(1.1), Err(FireBlocked::Cooldown));

        assert!(pistol.start_reload(1.1));
        assert_eq!(pistol.can_fire(2.0), Err(FireBlocked::Reloading));

        let dry = WeaponSlot::with_ammo(WeaponKind::Pistol, 0, 0);
        assert_eq!(dry.can_fire(0.0), Err(FireBlocked::MagazineEmpty));
    }

    #[test]
    fn blocked_shot_does_not_mutate() {
        let mut rifle = WeaponSlot::new(WeaponKind::Rifle);
        rifle.consume_round(0.0).unwrap();
        let before = rifle.clone();

        assert!(rifle.consume_round(0.05).is_err());
        assert_eq!(rifle, before);
    }

    #[test]
    fn reload_preconditions() {
        let mut full = WeaponSlot::new(WeaponKind::Pistol);
        let untouched = full.clone();
        assert!(!full.start_reload(0.0));
        assert!(!full.is_reloading);
        assert_eq!(full.bullets_in_magazine, 12);
        assert_eq!(full.total_bullets, 120);
        assert_eq!(full, untouched);

        let mut no_reserve = WeaponSlot::with_ammo(WeaponKind::Pistol, 3, 0);
        assert!(!no_reserve.start_reload(0.0));

        let mut partial = WeaponSlot::with_ammo(WeaponKind::Pistol, 3, 50);
        assert!(partial.start_reload(0.0));
        assert!(!partial.start_reload(0.1));
    }

    #[test]
    fn reload_completes_only_after_duration() {
        let mut slot = WeaponSlot::with_ammo(WeaponKind::Pistol, 2, 5);
        assert!(slot.start_reload(10.0));

        assert!(!slot.poll_reload(11.0));
        assert!(slot.is_reloading);

        assert!(slot.poll_reload(11.5));
        assert!(!slot.is_reloading);
        assert_eq!(slot.bullets_in_magazine, 7);
        assert_eq!(slot.total_bullets, 0);
    }

    #[test]
    fn ammo_is_conserved_across_reload() {
        let mut slot = WeaponSlot::with_ammo(WeaponKind::Rifle, 4, 100);
        let before = slot.bullets_in_magazine + slot.total_bullets;

        slot.start_reload(0.0);
        slot.poll_reload(5.0);

        assert_eq!(slot.bullets_in_magazine, 30);
        assert_eq!(slot.bullets_in_magazine + slot.total_bullets, before);
    }

    #[test]
    fn ammo_only_leaves_through_shots() {
        let mut slot = WeaponSlot::new(WeaponKind::Pistol);
        let before = slot.bullets_in_magazine + slot.total_bullets;
        let mut shots = 0;
        let mut reloads = 0;

        for step in 0..240u32 {
            let now = f64::from(step) * 0.3;
            if slot.poll_reload(now) {
                reloads += 1;
            }
            if step % 7 == 0 {
                slot.start_reload(now);
            }
            if step % 3 != 2 && slot.consume_round(now).is_ok() {
                shots += 1;
            }
            assert_eq!(slot.bullets_in_magazine + slot.total_bullets, before - shots);
        }

        assert!(reloads >= 2);
        assert!(shots > slot.max_magazine_size());
    }
}
