//! Registered account storage.

// self
use crate::{
	_prelude::*,
	auth::{User, Username},
	store::{StoreError, StoreFuture},
};

/// Storage contract for registered accounts.
pub trait UserStore
where
	Self: Send + Sync,
{
	/// Stores `user`, failing if the username is already taken.
	fn save(&self, user: User) -> StoreFuture<'_, ()>;

	/// Returns a copy of the account registered under `username`.
	fn find<'a>(&'a self, username: &'a str) -> StoreFuture<'a, Option<User>>;
}

/// In-process account table.
#[derive(Clone, Debug, Default)]
pub struct MemoryUserStore(Arc<RwLock<HashMap<Username, User>>>);
impl MemoryUserStore {
	/// Number of registered accounts.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no account is registered.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl UserStore for MemoryUserStore {
	fn save(&self, user: User) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.0.write();

			if guard.contains_key(&user.username) {
				return Err(StoreError::AlreadyExists);
			}

			guard.insert(user.username.clone(), user);

			Ok(())
		})
	}

	fn find<'a>(&'a self, username: &'a str) -> StoreFuture<'a, Option<User>> {
		Box::pin(async move { Ok(self.0.read().get(username).cloned()) })
	}
}
