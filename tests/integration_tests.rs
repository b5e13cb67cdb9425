//! Integration tests for wikitrans

mod integration;
