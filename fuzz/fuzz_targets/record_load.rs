#![no_main]

use std::io::Cursor;

use esm::{EsmReader, Record, ReaderLimits};
use libfuzzer_sys::fuzz_target;
use records::{
    land_data_types, Container, DialInfo, Dialogue, Land, Region, Script, Weapon, REC_CONT,
    REC_DIAL, REC_INFO, REC_LAND, REC_REGN, REC_SCPT, REC_WEAP,
};

fn load<T: Record>(reader: &mut EsmReader<Cursor<Vec<u8>>>) -> bool {
    T::load_record(reader).is_ok()
}

fuzz_target!(|data: &[u8]| {
    let mut reader = EsmReader::with_limits(ReaderLimits::for_testing());
    if reader.open(Cursor::new(data.to_vec()), "fuzz").is_err() {
        return;
    }

    let mut records = 0usize;
    while reader.has_more_recs() && records < 256 {
        records += 1;
        let Ok(name) = reader.get_rec_name() else {
            break;
        };
        let ok = match name {
            n if n == REC_CONT => load::<Container>(&mut reader),
            n if n == REC_DIAL => load::<Dialogue>(&mut reader),
            n if n == REC_INFO => load::<DialInfo>(&mut reader),
            n if n == REC_REGN => load::<Region>(&mut reader),
            n if n == REC_SCPT => load::<Script>(&mut reader),
            n if n == REC_WEAP => load::<Weapon>(&mut reader),
            n if n == REC_LAND => match Land::load_record(&mut reader) {
                Ok((mut land, _)) => land.load_data(land_data_types::ALL, &mut reader).is_ok(),
                Err(_) => false,
            },
            _ => reader.get_rec_header().and_then(|_| reader.skip_record()).is_ok(),
        };
        if !ok {
            break;
        }
    }
});
