//! leuchtfeuer-crypto – Schluessel-Ableitung und AEAD-Codec
//!
//! Ein statischer symmetrischer Schluessel wird einmalig per Scrypt aus
//! (Passwort, Salt) abgeleitet. Der Codec verschluesselt Nutzdaten mit
//! ChaCha20-Poly1305 und bindet einen Aufrufer-Kontext als Additional
//! Authenticated Data (AAD) an jeden Umschlag.
//!
//! ## Umschlag-Format
//! ```text
//! [auth_tag(16)] [nonce(12)] [ciphertext(n)]
//! ```

pub mod codec;
pub mod error;
pub mod schluessel;

pub use codec::{
    adress_kontext, kontext_aus_teilen, AeadCodec, NONCE_LAENGE, TAG_LAENGE, UMSCHLAG_MIN_LAENGE,
};
pub use error::{CryptoError, CryptoResult};
pub use schluessel::{SymmetrischerSchluessel, SCHLUESSEL_LAENGE};
