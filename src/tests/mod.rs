//! Scenario tests spanning several launch modules

mod orchestrator_tests;
