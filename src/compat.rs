//! Version-agnostic accessors for `VersionedMessage`
//!
//! The assembly service may return legacy or v0 messages. The signing path
//! only needs the header and the static keys, which live in different
//! places for each version.

use solana_sdk::{
    message::{MessageHeader, VersionedMessage},
    pubkey::Pubkey,
};

/// Get the message header for either message version
#[inline]
#[must_use]
pub fn message_header(message: &VersionedMessage) -> &MessageHeader {
    match message {
        VersionedMessage::Legacy(legacy) => &legacy.header,
        VersionedMessage::V0(v0) => &v0.header,
    }
}

/// Static account keys (lookup-table addresses are never signers)
#[inline]
#[must_use]
pub fn static_account_keys(message: &VersionedMessage) -> &[Pubkey] {
    match message {
        VersionedMessage::Legacy(legacy) => &legacy.account_keys,
        VersionedMessage::V0(v0) => &v0.account_keys,
    }
}

/// Accounts whose signatures the message requires, in slot order
///
/// Slot 0 is the fee payer; its signature is the transaction id.
#[must_use]
pub fn required_signers(message: &VersionedMessage) -> &[Pubkey] {
    let required = message_header(message).num_required_signatures as usize;
    let keys = static_account_keys(message);
    &keys[..required.min(keys.len())]
}

/// Whether the header's signer counts fit the static keys
///
/// `required_signers` clamps to the keys present; a header claiming more
/// signers than keys describes a transaction that can never be complete.
#[must_use]
pub fn header_is_consistent(message: &VersionedMessage) -> bool {
    let header = message_header(message);
    let keys = static_account_keys(message).len();
    let required = header.num_required_signatures as usize;
    required >= 1
        && required <= keys
        && (header.num_readonly_signed_accounts as usize) < required
        && (header.num_readonly_unsigned_accounts as usize) <= keys - required
}

/// Signature slot of `signer`, if the message requires its signature
#[must_use]
pub fn signer_slot(message: &VersionedMessage, signer: &Pubkey) -> Option<usize> {
    required_signers(message).iter().position(|k| k == signer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        instruction::{AccountMeta, Instruction},
        message::{v0, Message},
    };

    fn instruction(payer: Pubkey, cosigner: Pubkey) -> Instruction {
        Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[1, 2, 3],
            vec![
                AccountMeta::new(payer, true),
                AccountMeta::new(cosigner, true),
                AccountMeta::new_readonly(Pubkey::new_unique(), false),
            ],
        )
    }

    #[test]
    fn test_required_signers_legacy_and_v0_agree() {
        let payer = Pubkey::new_unique();
        let cosigner = Pubkey::new_unique();
        let ix = instruction(payer, cosigner);

        let legacy = VersionedMessage::Legacy(Message::new(&[ix.clone()], Some(&payer)));
        let v0 = VersionedMessage::V0(
            v0::Message::try_compile(&payer, &[ix], &[], Hash::default()).unwrap(),
        );

        for message in [&legacy, &v0] {
            assert_eq!(message_header(message).num_required_signatures, 2);
            let signers = required_signers(message);
            assert_eq!(signers[0], payer);
            assert!(signers.contains(&cosigner));
            assert_eq!(signer_slot(message, &payer), Some(0));
            assert!(signer_slot(message, &Pubkey::new_unique()).is_none());
        }
    }

    #[test]
    fn test_non_signer_has_no_slot() {
        let payer = Pubkey::new_unique();
        let readonly = Pubkey::new_unique();
        let ix = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[],
            vec![
                AccountMeta::new(payer, true),
                AccountMeta::new_readonly(readonly, false),
            ],
        );
        let message = VersionedMessage::Legacy(Message::new(&[ix], Some(&payer)));
        assert_eq!(required_signers(&message), &[payer]);
        assert!(signer_slot(&message, &readonly).is_none());
    }

    #[test]
    fn test_header_claiming_more_signers_than_keys_is_inconsistent() {
        let payer = Pubkey::new_unique();
        let ix = instruction(payer, Pubkey::new_unique());
        let mut message = VersionedMessage::Legacy(Message::new(&[ix], Some(&payer)));
        assert!(header_is_consistent(&message));

        if let VersionedMessage::Legacy(legacy) = &mut message {
            legacy.header.num_required_signatures = 9;
        }
        assert!(!header_is_consistent(&message));
        // the accessor still clamps to the keys that exist
        assert_eq!(required_signers(&message).len(), static_account_keys(&message).len());
    }
}
