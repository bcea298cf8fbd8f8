#![no_main]

use keepsake::link::{
    CoupleCard, Greeting, Personalization, decode_token, encode_token, token_from_query,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let _ = Greeting::decode(input);
    let _ = CoupleCard::decode(input);
    let _ = token_from_query(input);

    if let Ok(plain) = decode_token(input) {
        assert_eq!(decode_token(&encode_token(&plain)).ok(), Some(plain));
    }
    assert_eq!(decode_token(&encode_token(input)).ok().as_deref(), Some(input));
});
