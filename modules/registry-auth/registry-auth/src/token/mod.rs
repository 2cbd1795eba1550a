//! JWT token issuance and verification.

pub mod access;
pub mod clock;
pub mod id;
pub mod key;
pub mod refresh;

pub use access::{AccessTokenClaims, JwtAccessTokenIssuer};
pub use clock::{Clock, FixedClock, SystemClock};
pub use id::{IdGenerator, UuidGenerator};
pub use key::SigningKey;
pub use refresh::{JwtRefreshTokenIssuer, RefreshTokenClaims};
