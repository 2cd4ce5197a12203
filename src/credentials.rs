/// How a password is stored and later compared.
///
/// The service only ever stores what `seal` returns and asks `verify` whether a
/// supplied password matches it, so a hashing scheme can replace `Plaintext`
/// without touching registration or login rules.
pub trait CredentialVerifier: Send + Sync {
    fn seal(&self, password: &str) -> String;
    fn verify(&self, stored: &str, supplied: &str) -> bool;
}

/// Stores passwords verbatim and compares them exactly.
///
/// This matches the on-disk format of existing user documents. It offers no
/// protection for the stored secrets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plaintext;

impl CredentialVerifier for Plaintext {
    fn seal(&self, password: &str) -> String {
        password.to_owned()
    }

    fn verify(&self, stored: &str, supplied: &str) -> bool {
        stored == supplied
    }
}
