//! Tests for learning rate schedulers

use super::*;
use crate::optim::{AdamW, Optimizer};
use approx::assert_abs_diff_eq;

#[test]
fn test_no_warmup_starts_at_target() {
    let scheduler = LinearWarmupDecayLR::new(2e-5, 0, 100);
    assert_abs_diff_eq!(scheduler.get_lr(), 2e-5, epsilon = 1e-12);
}

#[test]
fn test_decays_to_zero_at_total() {
    let mut scheduler = LinearWarmupDecayLR::new(1.0, 0, 10);
    for _ in 0..10 {
        scheduler.step();
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.0, epsilon = 1e-6);

    // Stays at zero past the end
    scheduler.step();
    assert_abs_diff_eq!(scheduler.get_lr(), 0.0, epsilon = 1e-6);
}

#[test]
fn test_decay_midpoint() {
    let mut scheduler = LinearWarmupDecayLR::new(1.0, 0, 100);
    for _ in 0..50 {
        scheduler.step();
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.5, epsilon = 1e-6);
}

#[test]
fn test_warmup_then_decay() {
    let mut scheduler = LinearWarmupDecayLR::new(1.0, 10, 20);
    assert_abs_diff_eq!(scheduler.get_lr(), 0.0, epsilon = 1e-6);

    for _ in 0..5 {
        scheduler.step();
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.5, epsilon = 1e-6);

    for _ in 0..5 {
        scheduler.step();
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 1.0, epsilon = 1e-6);

    for _ in 0..5 {
        scheduler.step();
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.5, epsilon = 1e-6);
}

#[test]
fn test_decreases_monotonically_after_warmup() {
    let mut scheduler = LinearWarmupDecayLR::new(1.0, 0, 50);
    let mut prev_lr = scheduler.get_lr();
    for _ in 0..60 {
        scheduler.step();
        let lr = scheduler.get_lr();
        assert!(lr <= prev_lr, "LR should not increase: {lr} > {prev_lr}");
        prev_lr = lr;
    }
}

#[test]
fn test_apply_sets_optimizer_lr() {
    let mut optimizer = AdamW::default_params(0.0);
    let mut scheduler = LinearWarmupDecayLR::new(0.1, 0, 4);
    scheduler.step();
    scheduler.apply(&mut optimizer);
    assert_abs_diff_eq!(optimizer.lr(), 0.075, epsilon = 1e-6);
    assert_eq!(scheduler.current_step(), 1);
}

#[test]
fn test_zero_total_steps() {
    let scheduler = LinearWarmupDecayLR::new(1.0, 0, 0);
    assert_abs_diff_eq!(scheduler.get_lr(), 0.0, epsilon = 1e-6);
}
