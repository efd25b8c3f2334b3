//! Newtype keys and identity.
//!
//! Every credential the service hands out is a distinct newtype so a
//! [`SubscribeKey`] can never be passed where a [`PublishKey`] is expected,
//! even though both are strings on the wire.
//!
//! Credentials that grant access ([`AuthKey`], [`SecretKey`]) never print their
//! value through `Debug` and have no `Display`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Public key newtypes: an empty value is "not configured", so `new` returns
// `None` for it. Keys print as-is.
// ---------------------------------------------------------------------------
macro_rules! key_newtype {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wraps `value`; an empty string means the key is not configured.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                Some(Self(value.into())).filter(|key| !key.0.is_empty())
            }

            /// The key as sent on the wire.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for credential newtypes.
// Same shape as `key_newtype!` but with a redacting Debug and no Display.
// ---------------------------------------------------------------------------
macro_rules! secret_string {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            /// Wraps `value`; an empty string means no credential.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                Some(Self(value.into())).filter(|secret| !secret.0.is_empty())
            }

            /// Returns the raw credential. Never log the result.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "(***)"))
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Tenant keys
// ---------------------------------------------------------------------------

key_newtype! {
    /// Tenant identifier for read access. Required by every channel-group
    /// operation and by subscribe.
    SubscribeKey
}

key_newtype! {
    /// Tenant identifier for write access. Subscribe requires it alongside the
    /// subscribe key; it is also part of the request signature input.
    PublishKey
}

secret_string! {
    /// Per-request credential appended as the `auth` query parameter when an
    /// operation requires authentication.
    AuthKey
}

secret_string! {
    /// Shared secret used to sign requests. Never sent on the wire.
    SecretKey
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identity of this client, sent as the `uuid` query parameter on every request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates an identity from a caller-chosen string, returning `None` if empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Generates a fresh identity of the form `pn-<uuid v4>`.
    pub fn new_random() -> Self {
        Self(format!("pn-{}", Uuid::new_v4()))
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
