#![no_main]

use std::io::Cursor;

use esm::{EsmReader, ReaderLimits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = EsmReader::with_limits(ReaderLimits::for_testing());
    if reader.open(Cursor::new(data.to_vec()), "fuzz").is_err() {
        return;
    }

    // Walk every record and sub-record using only the generic primitives.
    let mut records = 0usize;
    while reader.has_more_recs() && records < 1024 {
        records += 1;
        if reader.get_rec_name().is_err() || reader.get_rec_header().is_err() {
            break;
        }
        let context = reader.get_context();
        while reader.has_more_subs() {
            if reader.get_sub_name().is_err() || reader.get_h_bytes().is_err() {
                break;
            }
        }
        let _ = reader.restore_context(&context);
        let _ = reader.skip_record();
    }
});
