//! Integration tests for the size and pool grammar.

use proxy_buffer_balancer::{
    bytes_to_size, parse_pool, parse_size, size_to_bytes, BufferPool, ParseError, Size, SizeUnit,
};

#[test]
fn test_gigabyte_suffix_becomes_megabyte() {
    for n in [1u64, 2, 16, 512, 4096] {
        let got = parse_size(&format!("{n}g"), true).unwrap();
        assert_eq!(got, format!("{n}m"));

        let got = parse_size(&format!("{n}G"), true).unwrap();
        assert_eq!(got, format!("{n}m"));
    }
}

#[test]
fn test_bare_number_is_megabytes() {
    assert_eq!(parse_size("1024", true).unwrap(), "1024m");
    assert_eq!(size_to_bytes("1024"), 1024 * 1024 * 1024);
}

#[test]
fn test_error_message() {
    let err = parse_size("0k", true).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid size value, must be an integer larger than 0: 0k"
    );
}

#[test]
fn test_pool_errors_carry_cause() {
    let err = parse_pool("0 invalid", true).unwrap_err();
    match &err {
        ParseError::InvalidPoolSize { field, source } => {
            assert_eq!(field, "invalid");
            assert!(matches!(**source, ParseError::InvalidSize(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "could not parse size with unit: invalid");
}

#[test]
fn test_pool_parse_accepts_zero_count() {
    let pool = BufferPool::parse("0 4k").unwrap().unwrap();
    assert_eq!(pool.count, 0);
    assert_eq!(pool.unit.bytes(), 4096);
    assert_eq!(pool.total_bytes(), 0);
}

#[test]
fn test_pool_without_normalize_keeps_spacing_inside() {
    assert_eq!(parse_pool(" 8  4K ", false).unwrap(), "8  4k");
    assert_eq!(parse_pool(" 8  4K ", true).unwrap(), "8 4k");
}

#[test]
fn test_size_accessors() {
    let size = Size::parse(" 16M ").unwrap().unwrap();
    assert_eq!(size.amount(), 16);
    assert_eq!(size.unit(), SizeUnit::Mega);
    assert_eq!(size.bytes(), 16 * 1024 * 1024);
    assert!(Size::parse("   ").unwrap().is_none());
}

#[test]
fn test_formatter_rounds_up_to_kilobyte() {
    assert_eq!(bytes_to_size(1), "1k");
    assert_eq!(bytes_to_size(4097), "5k");
    assert_eq!(bytes_to_size(1024 * 1024 + 1), "1025k");
}
