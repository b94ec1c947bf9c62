//! Unit tests for the batch converter
//!
//! This module contains unit tests for individual components of the
//! converter. Tests are organized by module and functionality.

pub mod fakes;
pub mod registry_tests;
pub mod report_tests;
