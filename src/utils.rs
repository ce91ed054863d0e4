use rand::Rng;

pub fn random_id() -> String {
    hex::encode(rand::rng().random::<[u8; 8]>())
}

/// Prepends `stun:` to an ICE server address that carries no scheme.
pub fn add_ice_url_scheme(url: &str) -> String {
    let url = url.trim();
    const SCHEMES: [&str; 4] = ["stun:", "stuns:", "turn:", "turns:"];
    if SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        url.to_string()
    } else {
        format!("stun:{url}")
    }
}
