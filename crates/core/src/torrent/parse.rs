//! Pure helpers shared by providers: info hashes, quality labels, magnet links.

const INFO_HASH_LEN: usize = 40;

/// Validate a raw info hash and normalize it to lowercase.
///
/// Returns `None` unless the input is exactly 40 ASCII hex characters.
pub fn parse_info_hash(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.len() != INFO_HASH_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(raw.to_ascii_lowercase())
}

/// Extract the info hash from a magnet URI (`...xt=urn:btih:<hash>&...`).
pub fn info_hash_from_magnet(magnet: &str) -> Option<String> {
    let start = magnet.find("btih:")? + "btih:".len();
    let rest = &magnet[start..];
    let end = rest.find('&').unwrap_or(rest.len());
    parse_info_hash(&rest[..end])
}

/// Derive a coarse quality label from a free-text release name.
///
/// Names without a recognised resolution yield `None`; such candidates
/// are dropped by providers.
pub fn quality_from_name(name: &str) -> Option<String> {
    let mut quality = resolution_from_name(name)?.to_string();

    if name.contains("10bit") {
        quality.push_str(" 10bit");
    }
    if name.contains("HDCAM") {
        quality.push_str(" (cam)");
    } else if name.contains("HDTS") || name.contains("HD-TS") {
        quality.push_str(" (telesync)");
    }

    Some(quality)
}

/// The first supported resolution mentioned in `name`, checked in ascending order.
pub fn resolution_from_name(name: &str) -> Option<&'static str> {
    ["720p", "1080p", "2160p"]
        .into_iter()
        .find(|q| name.contains(q))
}

/// Build a magnet URI for `info_hash` with an escaped display name and trackers.
pub fn build_magnet_url(info_hash: &str, name: &str, trackers: &[&str]) -> String {
    let mut url = format!(
        "magnet:?xt=urn:btih:{}&dn={}",
        info_hash,
        urlencoding::encode(name)
    );
    for tracker in trackers {
        url.push_str("&tr=");
        url.push_str(&urlencoding::encode(tracker));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    #[test]
    fn test_parse_info_hash_valid() {
        assert_eq!(parse_info_hash(HASH).as_deref(), Some(HASH));
    }

    #[test]
    fn test_parse_info_hash_lowercases() {
        let upper = HASH.to_uppercase();
        assert_eq!(parse_info_hash(&upper).as_deref(), Some(HASH));
    }

    #[test]
    fn test_parse_info_hash_rejects_wrong_length() {
        assert!(parse_info_hash("").is_none());
        assert!(parse_info_hash(&HASH[..39]).is_none());
        assert!(parse_info_hash(&format!("{}0", HASH)).is_none());
    }

    #[test]
    fn test_parse_info_hash_rejects_non_hex() {
        let bad = format!("{}zz", &HASH[..38]);
        assert!(parse_info_hash(&bad).is_none());
        // 40 bytes but multibyte characters
        let unicode = format!("{}é", &HASH[..38]);
        assert!(parse_info_hash(&unicode).is_none());
    }

    #[test]
    fn test_info_hash_from_magnet() {
        let magnet = format!("magnet:?xt=urn:btih:{}&dn=Some.Movie&tr=udp%3A%2F%2Ft", HASH);
        assert_eq!(info_hash_from_magnet(&magnet).as_deref(), Some(HASH));
    }

    #[test]
    fn test_info_hash_from_magnet_without_trailing_params() {
        let magnet = format!("magnet:?xt=urn:btih:{}", HASH.to_uppercase());
        assert_eq!(info_hash_from_magnet(&magnet).as_deref(), Some(HASH));
    }

    #[test]
    fn test_info_hash_from_magnet_invalid() {
        assert!(info_hash_from_magnet("magnet:?dn=nothing").is_none());
        assert!(info_hash_from_magnet("magnet:?xt=urn:btih:abc123&dn=x").is_none());
    }

    #[test]
    fn test_quality_from_name() {
        assert_eq!(
            quality_from_name("Movie.2019.1080p.BluRay.x264").as_deref(),
            Some("1080p")
        );
        assert_eq!(
            quality_from_name("Movie.2019.720p.WEB").as_deref(),
            Some("720p")
        );
        assert_eq!(
            quality_from_name("Movie.2019.2160p.10bit.HDR").as_deref(),
            Some("2160p 10bit")
        );
    }

    #[test]
    fn test_quality_from_name_source_markers() {
        assert_eq!(
            quality_from_name("Movie.2019.720p.HDCAM").as_deref(),
            Some("720p (cam)")
        );
        assert_eq!(
            quality_from_name("Movie.2019.1080p.HDTS").as_deref(),
            Some("1080p (telesync)")
        );
        assert_eq!(
            quality_from_name("Movie 2019 1080p HD-TS").as_deref(),
            Some("1080p (telesync)")
        );
    }

    #[test]
    fn test_quality_from_name_unclassified() {
        assert!(quality_from_name("Movie.2019.DVDRip.XviD").is_none());
        assert!(quality_from_name("").is_none());
    }

    #[test]
    fn test_resolution_ignores_markers() {
        assert_eq!(resolution_from_name("Show.S01E01.1080p.10bit.HDTS"), Some("1080p"));
        assert_eq!(resolution_from_name("Show.S01E01.720p.2160p"), Some("720p"));
        assert_eq!(resolution_from_name("Show.S01E01.HDTV"), None);
    }

    #[test]
    fn test_build_magnet_url() {
        let url = build_magnet_url(HASH, "Big Buck Bunny", &["udp://tracker.example:1337/announce"]);
        assert_eq!(
            url,
            format!(
                "magnet:?xt=urn:btih:{}&dn=Big%20Buck%20Bunny&tr=udp%3A%2F%2Ftracker.example%3A1337%2Fannounce",
                HASH
            )
        );
        assert_eq!(info_hash_from_magnet(&url).as_deref(), Some(HASH));
    }

    #[test]
    fn test_build_magnet_url_no_trackers() {
        let url = build_magnet_url(HASH, "x", &[]);
        assert!(!url.contains("&tr="));
    }
}
