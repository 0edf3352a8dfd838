//! TLS setup for `wss://` push URLs.

use rustls::crypto::{ring, CryptoProvider};

/// Installs the ring provider as the process default unless one is set.
pub(crate) fn ensure_crypto_provider() {
    if CryptoProvider::get_default().is_none() {
        // Loses only to a concurrent install, which is just as good.
        let _ = ring::default_provider().install_default();
    }
}
