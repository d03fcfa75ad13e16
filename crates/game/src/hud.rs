use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::weapon::WeaponSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationIcon {
    Join,
    Leave,
    Hit,
    Death,
    Kill,
    Pickup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub key: String,
    pub title: String,
    pub body: String,
    pub icon: NotificationIcon,
}

/// Fire-and-forget toast queue drained by the host HUD.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    pending: Rc<RefCell<VecDeque<Notification>>>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &self,
        key: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        icon: NotificationIcon,
    ) {
        self.pending.borrow_mut().push_back(Notification {
            key: key.into(),
            title: title.into(),
            body: body.into(),
            icon,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.pending.borrow_mut().drain(..).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmoIndicator {
    Unarmed,
    Ready { magazine: u32, total: u32 },
    Reloading,
    /// Magazine empty with reserve left.
    Reload,
    NoAmmo,
}

impl AmmoIndicator {
    pub fn for_slot(slot: &WeaponSlot) -> Self {
        if slot.is_empty() {
            Self::Unarmed
        } else if slot.is_reloading {
            Self::Reloading
        } else if slot.bullets_in_magazine > 0 {
            Self::Ready {
                magazine: slot.bullets_in_magazine,
                total: slot.total_bullets,
            }
        } else if slot.total_bullets > 0 {
            Self::Reload
        } else {
            Self::NoAmmo
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Unarmed => "-".to_string(),
            Self::Ready { magazine, total } => format!("{} / {}", magazine, total),
            Self::Reloading => "Reloading...".to_string(),
            Self::Reload => "Reload".to_string(),
            Self::NoAmmo => "No ammo".to_string(),
        }
    }
}
