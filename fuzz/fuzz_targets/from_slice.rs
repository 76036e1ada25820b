#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate walkdns;

fuzz_target!(|data: &[u8]| {
    // Parsing must never panic, and whatever parses must be printable and
    // serialisable again.
    if let Ok(m) = walkdns::Message::from_slice(data) {
        let _ = m.to_string();
        let _ = m.to_vec();

        for record in m.answers.iter().chain(&m.authorities).chain(&m.additionals) {
            let _ = m.domain(&record.name);
            let _ = m.resource(record);
        }
    }
});
