// Test modules for inference-conformance crate
//
// Each source module has a corresponding test module focused on behavior
// verification; anything that needs a live HTTP peer lives in tests/ with
// wiremock instead.
