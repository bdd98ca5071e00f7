use crate::token::Token;
use crate::{TokenClientError, TokenProvider};

pub struct RetrieveTokenCommand<T>
where
    T: TokenProvider,
{
    token_provider: T,
}

impl<T> RetrieveTokenCommand<T>
where
    T: TokenProvider,
{
    pub fn new(token_provider: T) -> Self {
        Self { token_provider }
    }

    /// Returns the current token, or a freshly minted or renewed one when `force_renew` is set.
    pub fn retrieve_token(self, force_renew: bool) -> Result<Token, TokenClientError> {
        if force_renew {
            self.token_provider.force_renew()
        } else {
            self.token_provider.token()
        }
    }
}
