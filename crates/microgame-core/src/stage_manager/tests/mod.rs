#[cfg(test)]
mod handle_tests;
