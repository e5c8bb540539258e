use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Creates an alphanumeric secret of the given length, e.g. used as API key
pub fn create_random_secret(secret_len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(secret_len)
        .map(char::from)
        .collect()
}
