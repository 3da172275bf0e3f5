// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_org_content(lists: usize) -> String {
    let mut out = String::new();
    for n in 0..lists {
        out.push_str(&format!(
            "* List {n}\n:PROPERTIES:\n:LIST-ID: L{n}\n:END:\n\
             ** TODO [#A] Call about invoice {n}\n\
             SCHEDULED: <2025-03-10 Mon 09:00>\n\
             :PROPERTIES:\n:EXTERNAL-ID: X{n}a\n:END:\n\
             Ask for the corrected total.\n\
             ** DONE Water plants :home:\n\
             CLOSED: [2025-03-09 Sun 18:00]\n\
             :PROPERTIES:\n:EXTERNAL-ID: X{n}b\n:END:\n"
        ));
    }
    out
}
