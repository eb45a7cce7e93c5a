use super::*;
use axum::http::HeaderValue;

fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(*name, HeaderValue::from_static(value));
    }
    map
}

#[test]
fn sniff_device_classifies_common_agents() {
    assert_eq!(sniff_device("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148"), DeviceClass::Mobile);
    assert_eq!(sniff_device("Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari/537.36"), DeviceClass::Mobile);
    assert_eq!(sniff_device("Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)"), DeviceClass::Tablet);
    assert_eq!(sniff_device("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0"), DeviceClass::Desktop);
}

#[test]
fn explicit_device_header_wins_over_user_agent() {
    let map = headers(&[(DEVICE_HEADER, "Tablet"), ("user-agent", "Mozilla/5.0 (iPhone) Mobile")]);
    assert_eq!(HeaderResolver::new(&map).device(), DeviceClass::Tablet);

    let map = headers(&[(DEVICE_HEADER, "toaster"), ("user-agent", "Mozilla/5.0 (iPhone) Mobile")]);
    assert_eq!(HeaderResolver::new(&map).device(), DeviceClass::Mobile);
}

#[test]
fn missing_headers_mean_anonymous_desktop() {
    let map = HeaderMap::new();
    let resolver = HeaderResolver::new(&map);
    assert_eq!(resolver.role(), None);
    assert_eq!(resolver.region(), None);
    assert_eq!(resolver.device(), DeviceClass::Desktop);
}

#[test]
fn role_and_region_are_trimmed_and_blank_is_absent() {
    let map = headers(&[(ROLE_HEADER, " admin "), (REGION_HEADER, "  ")]);
    let resolver = HeaderResolver::new(&map);
    assert_eq!(resolver.role().as_deref(), Some("admin"));
    assert_eq!(resolver.region(), None);
}
