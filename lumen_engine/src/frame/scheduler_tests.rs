//! Unit tests for scheduler.rs
//!
//! Exercises the per-frame state machine against MockFrameBackend.

use crate::device::Extent2D;
use crate::error::{Error, Result};
use crate::frame::backend::*;
use crate::frame::ledger::BringUpStage;
use crate::frame::mock_backend::*;
use crate::frame::scheduler::*;
use std::cell::RefCell;
use std::rc::Rc;

fn scheduler(width: u32, height: u32) -> FrameScheduler<MockFrameBackend> {
    FrameScheduler::new(MockFrameBackend::new(Extent2D::new(width, height)))
}

// ============================================================================
// STEADY STATE
// ============================================================================

#[test]
fn test_single_frame_primitive_order() {
    let mut scheduler = scheduler(800, 600);

    assert_eq!(scheduler.draw_frame(0.016).unwrap(), FrameOutcome::Presented);

    assert_eq!(
        scheduler.backend().calls,
        vec![
            "wait_for_fence 0",
            "acquire 0",
            "reset_fence 0",
            "begin_recording 0 0",
            "end_recording 0",
            "submit 0",
            "present 0 0",
        ]
    );
    assert_eq!(scheduler.current_frame(), 1);
}

#[test]
fn test_current_frame_is_frame_count_mod_two() {
    let mut scheduler = scheduler(800, 600);

    for n in 1..=25u64 {
        scheduler.draw_frame(0.016).unwrap();
        assert_eq!(scheduler.current_frame() as u64, n % MAX_FRAMES_IN_FLIGHT as u64);
    }
    assert_eq!(scheduler.stats().frames_presented, 25);
}

#[test]
fn test_slots_alternate() {
    let mut scheduler = scheduler(800, 600);
    scheduler.draw_frame(0.0).unwrap();
    scheduler.draw_frame(0.0).unwrap();
    scheduler.draw_frame(0.0).unwrap();

    let submits: Vec<&String> = scheduler
        .backend()
        .calls
        .iter()
        .filter(|c| c.starts_with("submit"))
        .collect();
    assert_eq!(submits, vec!["submit 0", "submit 1", "submit 0"]);
}

#[test]
fn test_suboptimal_acquire_still_renders() {
    let mut scheduler = scheduler(800, 600);
    scheduler
        .backend_mut()
        .acquire_script
        .push_back(AcquireOutcome::Acquired { image_index: 2, suboptimal: true });

    assert_eq!(scheduler.draw_frame(0.0).unwrap(), FrameOutcome::Presented);
    assert_eq!(scheduler.state(), PresentationState::Ready);
    assert_eq!(scheduler.backend().calls_matching("present 0 2"), 1);
}

// ============================================================================
// DRAW CALLBACKS
// ============================================================================

#[test]
fn test_draw_callbacks_run_in_registration_order() {
    let mut scheduler = scheduler(800, 600);
    let order = Rc::new(RefCell::new(Vec::new()));

    let first = order.clone();
    scheduler.add_draw_callback(move |_: &MockDevice, cmd: usize, _: f64| -> Result<()> {
        first.borrow_mut().push(format!("first {}", cmd));
        Ok(())
    });
    let second = order.clone();
    scheduler.add_draw_callback(move |_: &MockDevice, cmd: usize, dt: f64| -> Result<()> {
        second.borrow_mut().push(format!("second {} {}", cmd, dt));
        Ok(())
    });

    scheduler.draw_frame(0.5).unwrap();
    scheduler.draw_frame(0.25).unwrap();

    assert_eq!(scheduler.draw_callback_count(), 2);
    assert_eq!(
        *order.borrow(),
        vec!["first 0", "second 0 0.5", "first 1", "second 1 0.25"]
    );
}

struct CountingCallback {
    count: Rc<RefCell<u32>>,
}

impl DrawCallback<MockDevice, usize> for CountingCallback {
    fn record(&mut self, device: &MockDevice, _command_buffer: usize, _delta_time: f64) -> Result<()> {
        assert_eq!(device.name, "mock");
        *self.count.borrow_mut() += 1;
        Ok(())
    }
}

#[test]
fn test_draw_callback_trait_object() {
    let mut scheduler = scheduler(800, 600);
    let count = Rc::new(RefCell::new(0));
    scheduler.add_draw_callback(CountingCallback { count: count.clone() });

    for _ in 0..4 {
        scheduler.draw_frame(0.0).unwrap();
    }
    assert_eq!(*count.borrow(), 4);
}

#[test]
fn test_failing_callback_aborts_frame() {
    let mut scheduler = scheduler(800, 600);
    scheduler.add_draw_callback(|_: &MockDevice, _: usize, _: f64| -> Result<()> {
        Err(Error::Submission("bad draw".to_string()))
    });

    assert!(matches!(scheduler.draw_frame(0.0), Err(Error::Submission(_))));
    assert_eq!(scheduler.backend().submissions, 0);
    assert_eq!(scheduler.current_frame(), 0);
}

// ============================================================================
// STALENESS
// ============================================================================

#[test]
fn test_out_of_date_acquire_leaves_counter_and_fence_untouched() {
    let mut scheduler = scheduler(800, 600);
    scheduler.draw_frame(0.0).unwrap();
    scheduler.backend_mut().acquire_script.push_back(AcquireOutcome::OutOfDate);
    let fences_before = scheduler.backend().fence_signaled;

    assert_eq!(scheduler.draw_frame(0.0).unwrap(), FrameOutcome::Stale);

    assert_eq!(scheduler.current_frame(), 1);
    assert_eq!(scheduler.state(), PresentationState::Stale);
    assert_eq!(scheduler.backend().fence_signaled, fences_before);
    assert_eq!(scheduler.backend().calls_matching("reset_fence 1"), 0);
    assert_eq!(scheduler.backend().submissions, 1);
}

#[test]
fn test_stale_state_skips_without_touching_backend() {
    let mut scheduler = scheduler(800, 600);
    scheduler.backend_mut().acquire_script.push_back(AcquireOutcome::OutOfDate);
    scheduler.draw_frame(0.0).unwrap();
    let calls_before = scheduler.backend().calls.len();

    for _ in 0..5 {
        assert_eq!(scheduler.draw_frame(0.0).unwrap(), FrameOutcome::Skipped);
    }

    assert_eq!(scheduler.backend().calls.len(), calls_before);
    assert_eq!(scheduler.stats().frames_skipped, 5);
    assert_eq!(scheduler.stats().stale_events, 1);
}

#[test]
fn test_stale_present_still_advances_frame() {
    let mut scheduler = scheduler(800, 600);
    scheduler.backend_mut().present_script.push_back(PresentOutcome::Stale);

    assert_eq!(scheduler.draw_frame(0.0).unwrap(), FrameOutcome::PresentedStale);
    assert_eq!(scheduler.current_frame(), 1);
    assert_eq!(scheduler.state(), PresentationState::Stale);
    assert_eq!(scheduler.draw_frame(0.0).unwrap(), FrameOutcome::Skipped);
}

// ============================================================================
// RECREATION
// ============================================================================

#[test]
fn test_recreate_waits_idle_then_rebuilds() {
    let mut scheduler = scheduler(800, 600);
    scheduler.backend_mut().acquire_script.push_back(AcquireOutcome::OutOfDate);
    scheduler.draw_frame(0.0).unwrap();

    scheduler.backend_mut().set_surface_extent(Extent2D::new(1024, 768));
    let mut window = MockWindow::new(Extent2D::new(1024, 768));
    let extent = scheduler.recreate_swapchain(&mut window).unwrap();

    assert_eq!(extent, Extent2D::new(1024, 768));
    assert_eq!(scheduler.state(), PresentationState::Ready);
    let calls = &scheduler.backend().calls;
    let idle = calls.iter().position(|c| c == "wait_idle").unwrap();
    let rebuild = calls.iter().position(|c| c.starts_with("rebuild")).unwrap();
    assert!(idle < rebuild);
    assert_eq!(window.pumped, 0);

    assert_eq!(scheduler.draw_frame(0.0).unwrap(), FrameOutcome::Presented);
}

#[test]
fn test_recreate_spins_while_minimized() {
    let mut scheduler = scheduler(800, 600);
    let mut window = MockWindow::scripted(
        Extent2D::new(0, 0),
        &[Extent2D::new(0, 0), Extent2D::new(1024, 768)],
    );

    scheduler.recreate_swapchain(&mut window).unwrap();

    assert_eq!(window.pumped, 2);
    assert_eq!(scheduler.backend().calls_matching("rebuild 1024x768"), 1);
    assert_eq!(scheduler.stats().swapchain_recreations, 1);
}

#[test]
fn test_rebuild_failure_is_fatal_and_keeps_stale() {
    let mut scheduler = scheduler(800, 600);
    scheduler.backend_mut().acquire_script.push_back(AcquireOutcome::OutOfDate);
    scheduler.draw_frame(0.0).unwrap();
    scheduler.backend_mut().fail_on = Some(MockFailure::Rebuild);

    let mut window = MockWindow::new(Extent2D::new(640, 480));
    assert!(matches!(
        scheduler.recreate_swapchain(&mut window),
        Err(Error::SwapchainCreation(_))
    ));
    assert_eq!(scheduler.state(), PresentationState::Stale);
}

// ============================================================================
// FATAL ERRORS
// ============================================================================

#[test]
fn test_acquire_failure_propagates() {
    let mut scheduler = scheduler(800, 600);
    scheduler.backend_mut().fail_on = Some(MockFailure::Acquire);
    assert!(matches!(scheduler.draw_frame(0.0), Err(Error::Presentation(_))));
}

#[test]
fn test_submit_failure_propagates() {
    let mut scheduler = scheduler(800, 600);
    scheduler.backend_mut().fail_on = Some(MockFailure::Submit);
    assert!(matches!(scheduler.draw_frame(0.0), Err(Error::Submission(_))));
    assert_eq!(scheduler.current_frame(), 0);
}

#[test]
fn test_present_failure_propagates() {
    let mut scheduler = scheduler(800, 600);
    scheduler.backend_mut().fail_on = Some(MockFailure::Present);
    assert!(matches!(scheduler.draw_frame(0.0), Err(Error::Presentation(_))));
}

// ============================================================================
// SHUTDOWN
// ============================================================================

#[test]
fn test_shutdown_waits_idle_then_tears_down_in_reverse() {
    let mut scheduler = scheduler(800, 600);
    scheduler.draw_frame(0.0).unwrap();

    scheduler.shutdown().unwrap();

    let calls = &scheduler.backend().calls;
    assert_eq!(&calls[calls.len() - 2..], &["wait_idle", "teardown"]);
    let mut expected = BringUpStage::ALL.to_vec();
    expected.reverse();
    assert_eq!(scheduler.backend().torn_down, expected);
}

#[test]
fn test_shutdown_is_idempotent_and_blocks_frames() {
    let mut scheduler = scheduler(800, 600);
    scheduler.shutdown().unwrap();
    scheduler.shutdown().unwrap();

    assert_eq!(scheduler.backend().calls_matching("teardown"), 1);
    assert!(scheduler.is_shut_down());
    assert!(scheduler.draw_frame(0.0).is_err());
}
