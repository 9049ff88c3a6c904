// Integration tests for mirror passes and the scheduler

mod scheduler_tests;
mod support;
