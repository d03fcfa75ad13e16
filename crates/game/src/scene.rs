use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec3;

use crate::pickup::PickupKind;
use crate::weapon::WeaponKind;

/// Render-representation changes for the host to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    PlayerSpawned {
        peer_id: String,
        position: Vec3,
    },
    PlayerRemoved {
        peer_id: String,
    },
    WeaponAttached {
        owner: String,
        kind: WeaponKind,
    },
    WeaponDetached {
        owner: String,
        kind: WeaponKind,
    },
    ImpactSpawned {
        position: Vec3,
    },
    PickupSpawned {
        id: u32,
        kind: PickupKind,
        position: Vec3,
    },
    PickupRemoved {
        id: u32,
    },
}

/// Shared handle to the host-drained scene event queue.
#[derive(Debug, Clone, Default)]
pub struct SceneQueue {
    pending: Rc<RefCell<VecDeque<SceneEvent>>>,
}

impl SceneQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: SceneEvent) {
        self.pending.borrow_mut().push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    pub fn drain(&self) -> Vec<SceneEvent> {
        self.pending.borrow_mut().drain(..).collect()
    }
}
