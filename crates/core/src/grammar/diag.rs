pub use liquidcode_diagnostics::{Diagnostic, LineIndex, Severity, Span, codes};
