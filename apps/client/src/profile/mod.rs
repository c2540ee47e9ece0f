#![allow(dead_code)]

pub mod schools;
pub mod service;

use tokio::sync::watch;

use crate::models::profile::UserProfile;

/// The single shared, observable profile state. Every consumer subscribes
/// here instead of re-fetching independently, so there is one source of
/// truth for "the user's current region" and friends.
pub struct ProfileState {
    tx: watch::Sender<Option<UserProfile>>,
}

impl ProfileState {
    pub fn new() -> ProfileState {
        let (tx, _) = watch::channel(None);
        ProfileState { tx }
    }

    pub fn current(&self) -> Option<UserProfile> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.tx.subscribe()
    }

    pub(crate) fn publish(&self, profile: UserProfile) {
        // send_replace delivers even when no receiver is currently attached.
        self.tx.send_replace(Some(profile));
    }

    pub(crate) fn clear(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for ProfileState {
    fn default() -> Self {
        ProfileState::new()
    }
}
