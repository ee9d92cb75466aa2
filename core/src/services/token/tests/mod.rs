mod exchange_tests;
mod rotation_tests;
