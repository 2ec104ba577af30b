use tether::mach::{opcode, Device};

fn fresh() -> Device {
    let mut device = Device::new();
    device.take_output(); // discard the boot event
    device
}

fn exec(device: &mut Device, code: &[u8]) {
    device.frame(true, code);
}

#[test]
fn test_boot_event() {
    let mut device = Device::new();
    assert_eq!(device.take_output(), vec![0, 0xFF]);
}

#[test]
fn test_arithmetic() {
    let mut device = fresh();
    exec(&mut device, &[opcode::LIT8, 2, opcode::LIT8, 3, opcode::ADD]);
    assert_eq!(device.stack(), &[5]);
    exec(&mut device, &[opcode::LIT8, 10, opcode::SUB]);
    assert_eq!(device.stack(), &[-5]);
    exec(&mut device, &[opcode::LIT8, 3, opcode::MUL]);
    assert_eq!(device.stack(), &[-15]);
    exec(&mut device, &[opcode::NEG, opcode::LIT8, 4, opcode::DIV]);
    assert_eq!(device.stack(), &[3]);
}

#[test]
fn test_division_by_zero_yields_zero() {
    let mut device = fresh();
    exec(&mut device, &[opcode::LIT8, 9, opcode::LIT8, 0, opcode::DIV]);
    assert_eq!(device.stack(), &[0]);
}

#[test]
fn test_sixteen_bit_literal() {
    let mut device = fresh();
    exec(&mut device, &[opcode::LIT16, 0x12, 0x34]);
    assert_eq!(device.stack(), &[0x1234]);
}

#[test]
fn test_truth_is_all_bits() {
    let mut device = fresh();
    exec(&mut device, &[opcode::LIT8, 1, opcode::LIT8, 1, opcode::EQ]);
    assert_eq!(device.stack(), &[-1]);
    exec(&mut device, &[opcode::NOT]);
    assert_eq!(device.stack(), &[0]);
}

#[test]
fn test_shift_sign_selects_direction() {
    let mut device = fresh();
    exec(&mut device, &[opcode::LIT8, 8, opcode::LIT8, 2, opcode::SHIFT]);
    assert_eq!(device.stack(), &[2]);
    exec(
        &mut device,
        &[opcode::CLEAR, opcode::LIT8, 8, opcode::LIT8, 0xFE, opcode::SHIFT],
    );
    assert_eq!(device.stack(), &[32]);
}

#[test]
fn test_define_then_call() {
    let mut device = fresh();
    // 5 squared, as a committed definition
    device.frame(
        false,
        &[opcode::LIT8, 5, opcode::DUP, opcode::MUL, opcode::RETURN],
    );
    assert_eq!(device.here(), 5);
    assert_eq!(device.last(), 5);
    exec(&mut device, &[0x80, 0x00]);
    assert_eq!(device.stack(), &[25]);
    // scratch space was reclaimed
    assert_eq!(device.here(), 5);
}

#[test]
fn test_branching() {
    let mut device = fresh();
    exec(
        &mut device,
        &[opcode::BRANCH, 2, opcode::LIT8, 5, opcode::LIT8, 9],
    );
    assert_eq!(device.stack(), &[9]);

    let mut device = fresh();
    exec(
        &mut device,
        &[
            opcode::LIT8,
            0,
            opcode::ZBRANCH,
            2,
            opcode::LIT8,
            5,
            opcode::LIT8,
            9,
        ],
    );
    assert_eq!(device.stack(), &[9]);

    let mut device = fresh();
    exec(
        &mut device,
        &[
            opcode::LIT8,
            1,
            opcode::ZBRANCH,
            2,
            opcode::LIT8,
            5,
            opcode::LIT8,
            9,
        ],
    );
    assert_eq!(device.stack(), &[5, 9]);
}

#[test]
fn test_quote_pushes_address_and_skips() {
    let mut device = fresh();
    // [7] if with a true predicate
    exec(
        &mut device,
        &[
            opcode::LIT8,
            0xFF,
            opcode::QUOTE,
            3,
            opcode::LIT8,
            7,
            opcode::RETURN,
            opcode::IF,
        ],
    );
    assert_eq!(device.stack(), &[7]);
}

#[test]
fn test_choice_takes_the_right_branch() {
    let quotations = [
        opcode::QUOTE,
        3,
        opcode::LIT8,
        7,
        opcode::RETURN,
        opcode::QUOTE,
        3,
        opcode::LIT8,
        9,
        opcode::RETURN,
        opcode::CHOICE,
    ];
    let mut device = fresh();
    let mut code = vec![opcode::LIT8, 0xFF];
    code.extend(&quotations);
    exec(&mut device, &code);
    assert_eq!(device.stack(), &[7]);

    let mut device = fresh();
    let mut code = vec![opcode::LIT8, 0];
    code.extend(&quotations);
    exec(&mut device, &code);
    assert_eq!(device.stack(), &[9]);
}

#[test]
fn test_memory_store_and_fetch() {
    let mut device = fresh();
    exec(
        &mut device,
        &[
            opcode::LIT8,
            77,
            opcode::LIT8,
            100,
            opcode::STORE8,
            opcode::LIT8,
            100,
            opcode::FETCH8,
        ],
    );
    assert_eq!(device.stack(), &[77]);

    let mut device = fresh();
    exec(
        &mut device,
        &[
            opcode::LIT16,
            0x12,
            0x34,
            opcode::LIT8,
            100,
            opcode::STORE16,
            opcode::LIT8,
            100,
            opcode::FETCH16,
        ],
    );
    assert_eq!(device.stack(), &[0x1234]);
}

#[test]
fn test_stack_words() {
    let mut device = fresh();
    exec(
        &mut device,
        &[
            opcode::LIT8,
            1,
            opcode::LIT8,
            2,
            opcode::LIT8,
            3,
            opcode::LIT8,
            2,
            opcode::PICK,
        ],
    );
    assert_eq!(device.stack(), &[1, 2, 3, 1]);

    let mut device = fresh();
    exec(
        &mut device,
        &[
            opcode::LIT8,
            1,
            opcode::LIT8,
            2,
            opcode::LIT8,
            3,
            opcode::LIT8,
            2,
            opcode::ROLL,
        ],
    );
    assert_eq!(device.stack(), &[2, 3, 1]);

    let mut device = fresh();
    exec(
        &mut device,
        &[opcode::LIT8, 1, opcode::LIT8, 2, opcode::SWAP, opcode::DROP],
    );
    assert_eq!(device.stack(), &[2]);
}

#[test]
fn test_aux_stack() {
    let mut device = fresh();
    exec(
        &mut device,
        &[
            opcode::LIT8,
            5,
            opcode::PUSH,
            opcode::LIT8,
            1,
            opcode::PEEK,
            opcode::POP,
        ],
    );
    assert_eq!(device.stack(), &[1, 5, 5]);
}

#[test]
fn test_scalar_event_sizing() {
    for (value, expected) in &[
        (0i16, vec![0u8, 7]),
        (5, vec![1, 7, 5]),
        (-5, vec![1, 7, 0xFB]),
        (127, vec![1, 7, 127]),
        (-128, vec![1, 7, 0x80]),
        (128, vec![2, 7, 0, 128]),
        (-129, vec![2, 7, 0xFF, 0x7F]),
        (300, vec![2, 7, 1, 44]),
    ] {
        let mut device = fresh();
        let mut code = vec![opcode::LIT16, (value >> 8) as u8, *value as u8];
        code.extend(&[opcode::LIT8, 7, opcode::EVENT]);
        exec(&mut device, &code);
        assert_eq!(&device.take_output(), expected, "value {}", value);
    }
}

#[test]
fn test_packed_event() {
    let mut device = fresh();
    exec(
        &mut device,
        &[
            opcode::LIT8,
            42,
            opcode::EVENT_HEADER,
            opcode::LIT8,
            7,
            opcode::EVENT_BODY8,
            opcode::LIT16,
            1,
            44,
            opcode::EVENT_BODY16,
            opcode::EVENT_FOOTER,
        ],
    );
    assert_eq!(device.take_output(), vec![3, 42, 7, 1, 44]);
}

#[test]
fn test_underflow_reports_an_event() {
    let mut device = fresh();
    exec(&mut device, &[opcode::ADD]);
    let output = device.take_output();
    assert_eq!(&output[..3], &[1, 0xFE, 2]);
}

#[test]
fn test_loop_word() {
    let mut device = fresh();
    // committed word: send value 5 as event 7
    device.frame(
        false,
        &[
            opcode::LIT8,
            5,
            opcode::LIT8,
            7,
            opcode::EVENT,
            opcode::RETURN,
        ],
    );
    exec(&mut device, &[opcode::LIT8, 0, opcode::SET_LOOP]);
    assert_eq!(device.loop_word(), 0);
    device.service();
    device.service();
    assert_eq!(device.take_output(), vec![1, 7, 5, 1, 7, 5]);
    exec(&mut device, &[opcode::STOP_LOOP]);
    assert_eq!(device.loop_word(), -1);
    device.service();
    assert_eq!(device.take_output(), Vec::<u8>::new());
}

#[test]
fn test_reset_clears_the_board() {
    let mut device = fresh();
    device.frame(false, &[opcode::DUP, opcode::DUP, opcode::RETURN]);
    exec(&mut device, &[opcode::LIT8, 3, opcode::LIT8, 0, opcode::SET_LOOP]);
    assert!(device.here() > 0);
    exec(&mut device, &[opcode::RESET]);
    assert_eq!(device.here(), 0);
    assert_eq!(device.last(), 0);
    assert_eq!(device.loop_word(), -1);
    assert_eq!(device.stack(), &[] as &[i16]);
}

#[test]
fn test_forget_rolls_the_dictionary_back() {
    let mut device = fresh();
    device.frame(false, &[opcode::DUP, opcode::DUP, opcode::RETURN]);
    assert_eq!(device.here(), 3);
    exec(&mut device, &[opcode::LIT8, 0, opcode::FORGET]);
    assert_eq!(device.here(), 0);
}

#[test]
fn test_pins_latch() {
    let mut device = fresh();
    exec(
        &mut device,
        &[opcode::LIT8, 0xFF, opcode::LIT8, 11, opcode::DIGITAL_WRITE],
    );
    assert_eq!(device.pin_level(11), -1);
    exec(&mut device, &[opcode::LIT8, 11, opcode::DIGITAL_READ]);
    assert_eq!(device.stack(), &[-1]);

    let mut device = fresh();
    device.set_pin_level(20, 300);
    exec(&mut device, &[opcode::LIT8, 20, opcode::ANALOG_READ]);
    assert_eq!(device.stack(), &[300]);
}

#[test]
fn test_pin_mode_and_isr_slots() {
    let mut device = fresh();
    exec(
        &mut device,
        &[opcode::LIT8, 11, opcode::LIT8, 1, opcode::PIN_MODE],
    );
    assert_eq!(device.pin_mode(11), 1);
    // word address 9, interrupt 2, mode rising
    exec(
        &mut device,
        &[
            opcode::LIT8,
            9,
            opcode::LIT8,
            2,
            opcode::LIT8,
            3,
            opcode::ATTACH_ISR,
        ],
    );
    assert_eq!(device.isr(2), 9);
    exec(&mut device, &[opcode::LIT8, 2, opcode::DETACH_ISR]);
    assert_eq!(device.isr(2), -1);
}

#[test]
fn test_runaway_code_is_bounded() {
    let mut device = fresh();
    // a branch to itself must not wedge the simulator
    exec(&mut device, &[opcode::BRANCH, 0xFE]);
}

#[test]
fn test_milliseconds_pushes_one_value() {
    let mut device = fresh();
    exec(&mut device, &[opcode::MILLISECONDS]);
    assert_eq!(device.stack().len(), 1);
}
