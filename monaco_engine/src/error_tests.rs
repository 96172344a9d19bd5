//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("vkCreateDevice failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("vkCreateDevice failed"));
}

#[test]
fn test_out_of_memory_display() {
    let err = Error::OutOfMemory;
    assert_eq!(format!("{}", err), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("Constant buffer width 20".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("Constant buffer width 20"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("Swap chain".to_string());
    assert_eq!(format!("{}", err), "Initialization failed: Swap chain");
}

#[test]
fn test_asset_errors_display() {
    assert_eq!(
        format!("{}", Error::AssetNotFound("crate.obj".to_string())),
        "Asset not found: crate.obj"
    );
    assert_eq!(
        format!("{}", Error::ParseFailed("bad DDS magic".to_string())),
        "Parse failed: bad DDS magic"
    );
}

#[test]
fn test_invalid_argument_and_unsupported_display() {
    assert_eq!(
        format!("{}", Error::InvalidArgument("width is 0".to_string())),
        "Invalid argument: width is 0"
    );
    assert_eq!(
        format!("{}", Error::Unsupported("FBX".to_string())),
        "Unsupported: FBX"
    );
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let debug = format!("{:?}", Error::BackendError("test".to_string()));
    assert!(debug.contains("BackendError"));

    let debug = format!("{:?}", Error::ParseFailed("obj".to_string()));
    assert!(debug.contains("ParseFailed"));
}

#[test]
fn test_error_clone_and_eq() {
    let err1 = Error::InvalidArgument("empty name".to_string());
    let err2 = err1.clone();
    assert_eq!(err1, err2);
    assert_ne!(err1, Error::OutOfMemory);
}

// ============================================================================
// RESULT TYPE
// ============================================================================

#[test]
fn test_result_question_mark_propagation() {
    fn inner() -> Result<u32> {
        Err(Error::AssetNotFound("a.png".to_string()))
    }
    fn outer() -> Result<u32> {
        let value = inner()?;
        Ok(value + 1)
    }

    assert_eq!(outer(), Err(Error::AssetNotFound("a.png".to_string())));
}
