//! Unit tests for swap_chain.rs

use crate::error::Error;
use crate::graphics_device::mock_graphics_device::{calls, mock_backend, MockWindow};
use crate::graphics_device::{register_graphics_backend, GraphicsConfig, Window};
use crate::render::{Device, DeviceContext, SwapChain, Texture};

#[test]
fn test_init_with_backend_fills_all_owners() {
    let (backend, log) = mock_backend(800, 600, 4);
    let mut device = Device::new();
    let mut context = DeviceContext::new();
    let mut back_buffer = Texture::new();
    let mut swap_chain = SwapChain::new();

    swap_chain
        .init_with_backend(&mut device, &mut context, &mut back_buffer, backend, 4)
        .unwrap();

    assert!(device.is_valid());
    assert!(context.is_valid());
    assert!(swap_chain.is_valid());
    assert_eq!(back_buffer.texture().unwrap().desc().width, 800);
    assert_eq!(swap_chain.sample_count(), 4);
    assert_eq!(calls(&log), vec!["back_buffer"]);
}

#[test]
fn test_init_through_registered_backend() {
    register_graphics_backend("mock-swapchain-test", |window, config| {
        let (width, height) = window.client_size();
        Ok(mock_backend(width, height, config.sample_count).0)
    });
    let config = GraphicsConfig {
        backend: "mock-swapchain-test".to_string(),
        sample_count: 1,
        ..GraphicsConfig::default()
    };
    let window = MockWindow { width: 640, height: 480 };

    let mut device = Device::new();
    let mut context = DeviceContext::new();
    let mut back_buffer = Texture::new();
    let mut swap_chain = SwapChain::new();
    swap_chain.init(&mut device, &mut context, &mut back_buffer, &window, &config).unwrap();

    assert_eq!(swap_chain.width(), 640);
    assert_eq!(swap_chain.height(), 480);
}

#[test]
fn test_unknown_backend_fails_initialization() {
    let config = GraphicsConfig {
        backend: "does-not-exist".to_string(),
        ..GraphicsConfig::default()
    };
    let window = MockWindow { width: 640, height: 480 };
    let mut device = Device::new();
    let mut context = DeviceContext::new();
    let mut back_buffer = Texture::new();
    let mut swap_chain = SwapChain::new();

    let result = swap_chain.init(&mut device, &mut context, &mut back_buffer, &window, &config);

    assert!(matches!(result, Err(Error::InitializationFailed(_))));
    assert!(!device.is_valid());
    assert!(!swap_chain.is_valid());
}

#[test]
fn test_zero_sized_window_is_rejected() {
    let window = MockWindow { width: 0, height: 480 };
    let mut swap_chain = SwapChain::new();
    let result = swap_chain.init(
        &mut Device::new(),
        &mut DeviceContext::new(),
        &mut Texture::new(),
        &window,
        &GraphicsConfig::default(),
    );
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_present_and_resize() {
    let (backend, log) = mock_backend(800, 600, 1);
    let mut back_buffer = Texture::new();
    let mut swap_chain = SwapChain::new();
    swap_chain
        .init_with_backend(&mut Device::new(), &mut DeviceContext::new(), &mut back_buffer, backend, 1)
        .unwrap();

    swap_chain.present(true).unwrap();
    swap_chain.present(false).unwrap();
    swap_chain.resize(1024, 768, &mut back_buffer).unwrap();

    assert_eq!(back_buffer.texture().unwrap().desc().width, 1024);
    let log = calls(&log);
    assert!(log.contains(&"present(1)".to_string()));
    assert!(log.contains(&"present(0)".to_string()));
    assert!(log.contains(&"resize_buffers(1024,768)".to_string()));
}

#[test]
fn test_destroy_twice_and_present_after_destroy() {
    let (backend, _log) = mock_backend(800, 600, 1);
    let mut swap_chain = SwapChain::new();
    swap_chain
        .init_with_backend(&mut Device::new(), &mut DeviceContext::new(), &mut Texture::new(), backend, 1)
        .unwrap();

    swap_chain.destroy();
    swap_chain.destroy();
    assert!(swap_chain.present(true).is_err());
}
