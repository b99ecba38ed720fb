//! Natural filename ordering
//!
//! `img2.png` sorts before `img10.png`: where both remaining strings start
//! with an ASCII digit run, the runs are compared by numeric value.
//! Scanning still advances one character at a time, so a run is compared
//! again from each of its suffixes until the strings diverge.

use std::cmp::Ordering;

/// Compare two names the way a person would
///
/// Case-insensitive except as a final tie-break, where the original
/// strings are compared byte-wise. Only ASCII digits form numbers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let fa: Vec<char> = a.to_lowercase().chars().collect();
    let fb: Vec<char> = b.to_lowercase().chars().collect();

    let mut i = 0;
    while i < fa.len() && i < fb.len() {
        let (ra, rb) = (&fa[i..], &fb[i..]);

        if let (Some(na), Some(nb)) = (digit_run(ra), digit_run(rb)) {
            let ord = cmp_numeric(na, nb);
            if ord != Ordering::Equal {
                return ord;
            }
        }

        let ord = ra[0].cmp(&rb[0]);
        if ord != Ordering::Equal {
            return ord;
        }

        i += 1;
    }

    // shorter compares lesser, then case-sensitive
    fa.len().cmp(&fb.len()).then_with(|| a.cmp(b))
}

/// Leading ASCII digit run, if any
fn digit_run(s: &[char]) -> Option<&[char]> {
    let end = s.iter().take_while(|c| c.is_ascii_digit()).count();
    (end > 0).then(|| &s[..end])
}

/// Compare digit runs by value without parsing into a fixed-width integer
fn cmp_numeric(a: &[char], b: &[char]) -> Ordering {
    let a = strip_zeros(a);
    let b = strip_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn strip_zeros(s: &[char]) -> &[char] {
    let zeros = s.iter().take_while(|&&c| c == '0').count();
    &s[zeros..]
}
