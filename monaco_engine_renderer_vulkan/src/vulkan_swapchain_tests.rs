//! Unit tests for vulkan_swapchain.rs (present mode selection, no GPU)

use super::*;

#[test]
fn test_vsync_always_uses_fifo() {
    let available = [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO];
    assert_eq!(choose_present_mode(true, &available), vk::PresentModeKHR::FIFO);
}

#[test]
fn test_no_vsync_prefers_mailbox() {
    let available = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::MAILBOX];
    assert_eq!(choose_present_mode(false, &available), vk::PresentModeKHR::MAILBOX);
}

#[test]
fn test_no_vsync_falls_back_to_immediate_then_fifo() {
    let available = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
    assert_eq!(choose_present_mode(false, &available), vk::PresentModeKHR::IMMEDIATE);
    assert_eq!(choose_present_mode(false, &[vk::PresentModeKHR::FIFO]), vk::PresentModeKHR::FIFO);
}
