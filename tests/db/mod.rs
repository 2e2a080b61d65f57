pub mod memory_test;
