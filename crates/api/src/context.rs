use artisan_core::AccountId;

/// The authenticated caller, inserted into request extensions by
/// [`crate::middleware::auth_middleware`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccountContext {
    account_id: AccountId,
}

impl AccountContext {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }
}
