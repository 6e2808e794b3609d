/// Emitter configuration.
#[derive(Debug, Clone)]
pub struct EmitConfig {
    /// One indentation unit; hard tabs by default.
    pub indent: String,
    /// Name of the emitted module in the module stanza file.
    pub module: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        EmitConfig {
            indent: "\t".to_string(),
            module: "prog".to_string(),
        }
    }
}
