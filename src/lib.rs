//! A calculator that explains its results.
//!
//! Arithmetic is evaluated locally by a strict keypad grammar; explanations
//! and word-problem answers come from Gemini as schema-checked JSON.

pub mod ai;
pub mod calculator;
pub mod config;
pub mod history;
pub mod ui;
