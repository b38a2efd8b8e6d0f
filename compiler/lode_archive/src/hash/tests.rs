use super::*;
use pretty_assertions::assert_eq;

#[test]
fn digest_is_fixed_across_builds() {
    assert_eq!(
        hash_string("").to_hex(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(
        hash_bytes(b"abc").to_hex(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn hex_is_file_name_safe() {
    let hex = hash_string("example.com/some/pkg").to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    assert_eq!(hash_string("example.com/some/pkg").to_string(), hex);
}

#[test]
fn hashing_is_deterministic() {
    assert_eq!(hash_string("fmt"), hash_string("fmt"));
    assert_ne!(hash_string("fmt"), hash_string("os"));
    assert_eq!(hash_string("abc"), hash_bytes(b"abc"));
    assert_ne!(hash_bytes(b"abc"), hash_bytes(b"abd"));
}
