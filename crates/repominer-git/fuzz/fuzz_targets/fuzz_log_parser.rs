#![no_main]

use libfuzzer_sys::fuzz_target;
use repominer_git::parse_log;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let parsed = parse_log(text.lines().map(str::to_string));
    // Counts must stay consistent no matter how mangled the stream is
    for commit in &parsed.commits {
        assert!(commit.diffs.iter().all(|d| d.hunk_lines.len() < data.len() + 1));
    }
});
