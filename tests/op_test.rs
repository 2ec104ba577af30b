use tether::mach::{disassemble, opcode, Compiler, Op};

#[test]
fn test_literal_encoding_lengths() {
    let compiler = Compiler::new();
    let dict = compiler.dictionary();
    for x in i16::min_value()..=i16::max_value() {
        let bytes = Op::Literal(x).encode(dict).unwrap();
        if (-128..=127).contains(&x) {
            assert_eq!(bytes.len(), 2, "{}", x);
            assert_eq!(bytes[0], opcode::LIT8);
        } else {
            assert_eq!(bytes.len(), 3, "{}", x);
            assert_eq!(bytes[0], opcode::LIT16);
        }
    }
}

#[test]
fn test_literal_round_trip() {
    let compiler = Compiler::new();
    let dict = compiler.dictionary();
    for &x in &[0, 1, -1, 127, -128, 128, -129, 300, -300, 32767, -32768] {
        let bytes = Op::Literal(x).encode(dict).unwrap();
        assert_eq!(disassemble(&bytes, dict), vec![Op::Literal(x)], "{}", x);
    }
}

#[test]
fn test_call_addressing() {
    let compiler = Compiler::new();
    let dict = compiler.dictionary();
    for &addr in &[0, 1, 127, 128, 255, 256, 0x1234, 32767] {
        let word = Op::Word {
            addr,
            name: format!("({})", addr),
        };
        let bytes = word.encode(dict).unwrap();
        assert_eq!(bytes.len(), 2);
        assert_ne!(bytes[0] & 0x80, 0);
        assert_eq!((((bytes[0] & 0x7F) as i16) << 8) | bytes[1] as i16, addr);
        match disassemble(&bytes, dict).as_slice() {
            [Op::Word { addr: found, .. }] => assert_eq!(*found, addr),
            other => panic!("decoded {:?}", other),
        }
    }
    let negative = Op::Word {
        addr: -1,
        name: "bad".to_string(),
    };
    assert!(negative.encode(dict).is_err());
}

#[test]
fn test_primitive_encoding() {
    let compiler = Compiler::new();
    let dict = compiler.dictionary();
    assert_eq!(Op::Add.encode(dict).unwrap(), vec![opcode::ADD]);
    assert_eq!(Op::Return.encode(dict).unwrap(), vec![opcode::RETURN]);
    assert_eq!(Op::SetLoop.encode(dict).unwrap(), vec![opcode::SET_LOOP]);
    assert_eq!(Op::NoOperation.encode(dict).unwrap(), Vec::<u8>::new());
    assert_eq!(Op::User(100).encode(dict).unwrap(), vec![100]);
}

#[test]
fn test_unknown_byte_decodes_as_user() {
    let compiler = Compiler::new();
    let dict = compiler.dictionary();
    let ops = disassemble(&[99], dict);
    assert_eq!(ops, vec![Op::User(99)]);
    assert_eq!(ops[0].to_string(), "(user99)");
}

#[test]
fn test_operand_decoding() {
    let compiler = Compiler::new();
    let dict = compiler.dictionary();
    assert_eq!(
        disassemble(&[opcode::LIT8, 0xFF], dict),
        vec![Op::Literal(-1)]
    );
    assert_eq!(
        disassemble(&[opcode::LIT16, 0x12, 0x34], dict),
        vec![Op::Literal(0x1234)]
    );
    assert_eq!(
        disassemble(&[opcode::BRANCH, 0xFE], dict),
        vec![Op::Branch(-2)]
    );
    assert_eq!(
        disassemble(&[opcode::ZBRANCH, 4], dict),
        vec![Op::ZeroBranch(4)]
    );
    assert_eq!(disassemble(&[opcode::QUOTE, 3], dict), vec![Op::Quote(3)]);
}

#[test]
fn test_named_call_in_disassembly() {
    let mut compiler = Compiler::new();
    // a body over two bytes commits and becomes addressable
    compiler.define("thrice", tether::lang::read("dup dup dup").unwrap());
    let call = compiler.force("thrice").unwrap();
    assert_eq!(call.len(), 2);
    let ops = disassemble(&call, compiler.dictionary());
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].to_string(), "thrice");
}
