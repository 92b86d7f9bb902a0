//! Tests for reply parsing.

use advocate::guidance::parse_response;

#[test]
fn parses_all_four_sections() {
    let reply = "YOUR RIGHTS:\nRefund within 30 days.\n\n\
                 IMMEDIATE STEPS:\n1. Write to the landlord.\n2. Keep copies.\n\n\
                 REQUIRED DOCUMENTS:\nLease, receipts\n\n\
                 FORMAL NOTICE FORMAT:\nDear Sir/Madam,\n";
    let answer = parse_response(reply);
    assert_eq!(answer.rights, "Refund within 30 days.");
    assert_eq!(answer.steps, "1. Write to the landlord.\n2. Keep copies.");
    assert_eq!(answer.docs, "Lease, receipts");
    assert_eq!(answer.notice, "Dear Sir/Madam,");
}

#[test]
fn missing_section_is_empty_and_neighbours_are_intact() {
    let reply = "YOUR RIGHTS: a\nREQUIRED DOCUMENTS: c\nFORMAL NOTICE FORMAT: d";
    let answer = parse_response(reply);
    assert_eq!(answer.rights, "a");
    assert_eq!(answer.steps, "");
    assert_eq!(answer.docs, "c");
    assert_eq!(answer.notice, "d");
}

#[test]
fn sections_out_of_order_are_still_separated() {
    let reply = "FORMAL NOTICE FORMAT: d\nYOUR RIGHTS: a\nIMMEDIATE STEPS: b";
    let answer = parse_response(reply);
    assert_eq!(answer.notice, "d");
    assert_eq!(answer.rights, "a");
    assert_eq!(answer.steps, "b");
    assert_eq!(answer.docs, "");
}

#[test]
fn markdown_decoration_around_headers_is_kept_in_content() {
    let reply = "**YOUR RIGHTS:** a **IMMEDIATE STEPS:** b";
    let answer = parse_response(reply);
    assert_eq!(answer.rights, "** a **");
    assert_eq!(answer.steps, "** b");
}

#[test]
fn reply_without_headers_is_all_empty() {
    let answer = parse_response("I'm sorry, I can't help with that.");
    assert!(answer.is_empty());
}

#[test]
fn empty_reply_is_all_empty() {
    assert!(parse_response("").is_empty());
}

#[test]
fn non_ascii_content_survives() {
    let reply = "YOUR RIGHTS: आपको जमा राशि वापस पाने का अधिकार है।\nIMMEDIATE STEPS: நோட்டீஸ் அனுப்பவும்";
    let answer = parse_response(reply);
    assert_eq!(answer.rights, "आपको जमा राशि वापस पाने का अधिकार है।");
    assert_eq!(answer.steps, "நோட்டீஸ் அனுப்பவும்");
}
