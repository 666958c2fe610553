/*!
 * HTTP provider tests against a local mock server
 */

pub mod google_test;
