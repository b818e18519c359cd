//! Stripping of terminal styling codes from raw log text.

/// Remove ANSI escape sequences from a log payload.
///
/// Build logs arrive with embedded color and cursor codes; this strips
/// `ESC [ … <final>` CSI sequences (parameters and intermediates included)
/// and drops any other two-character escape. Runs per frame, since frames
/// arrive incrementally. Plain text passes through unchanged.
pub fn strip_styling(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            output.push(c);
            continue;
        }

        match chars.next() {
            // CSI sequence: consume through the final byte (0x40-0x7e).
            Some('[') => {
                for next in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&next) {
                        break;
                    }
                }
            }
            // Other escapes take a single following character.
            Some(_) => {}
            // Bare ESC at end of input.
            None => break,
        }
    }

    output
}
