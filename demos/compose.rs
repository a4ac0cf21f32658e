use std::fs;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use signpage::{add_signature_page, SignatureRequest};

fn main() {
    let pdf_mem = fs::read("demos/data/contract_example.pdf").unwrap_or(vec![]);
    let image_mem = fs::read("demos/data/signature_example.png").unwrap_or(vec![]);

    let request = SignatureRequest {
        pdf: BASE64.encode(pdf_mem),
        image: BASE64.encode(image_mem),
        signature_name: "Jane Doe".to_owned(),
    };

    let response = add_signature_page(&request).unwrap();

    fs::write(
        "contract_with_signature_page.pdf",
        BASE64.decode(response.pdf).unwrap(),
    )
    .unwrap();
}
