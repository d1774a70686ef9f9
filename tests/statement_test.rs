mod common;
use common::*;
use tinybasic::lang::ErrorCode;
use tinybasic::mach::Status;

#[test]
fn test_print_string() {
    let mut s = session();
    type_program(&mut s, &[r#"10 PRINT "HI""#, "20 END"]);
    enter(&mut s, "RUN");
    assert_eq!(exec(&mut s), "HI\n");
}

#[test]
fn test_let_and_print() {
    let mut s = session();
    type_program(&mut s, &["10 LET A=5", "20 PRINT A", "30 END"]);
    enter(&mut s, "RUN");
    assert_eq!(exec(&mut s), "5\n");
}

#[test]
fn test_let_is_optional() {
    let mut s = session();
    enter(&mut s, "LET A=2");
    enter(&mut s, "A=A*3");
    enter(&mut s, "PRINT A");
    assert_eq!(exec(&mut s), "::6\n");
    assert_eq!(s.runtime.variable('A'), 6);
}

#[test]
fn test_gosub_return() {
    let mut s = session();
    type_program(
        &mut s,
        &[
            "10 GOSUB 100",
            "20 PRINT 2",
            "30 END",
            "100 PRINT 1",
            "110 RETURN",
        ],
    );
    enter(&mut s, "RUN");
    assert_eq!(exec(&mut s), "1\n2\n");
    assert_eq!(s.runtime.control_depth(), 0);
}

#[test]
fn test_if() {
    let mut s = session();
    type_program(
        &mut s,
        &[
            r#"10 IF 1<2 THEN PRINT "YES""#,
            r#"20 IF 2<1 THEN PRINT "NO""#,
            r#"30 IF 3=3 PRINT "EQ""#,
            r#"40 IF 3<>3 PRINT "NE""#,
            "50 END",
        ],
    );
    enter(&mut s, "RUN");
    assert_eq!(exec(&mut s), "YES\nEQ\n");
}

#[test]
fn test_loop_with_goto() {
    let mut s = session();
    type_program(
        &mut s,
        &[
            "10 A=1",
            "20 A=A+1",
            "30 IF A<5 GOTO 20",
            "40 PRINT A",
            "50 END",
        ],
    );
    enter(&mut s, "RUN");
    assert_eq!(exec(&mut s), "5\n");
}

#[test]
fn test_input_waits_for_each_line() {
    let mut s = session();
    type_program(&mut s, &["10 INPUT A,B", "20 PRINT A+B", "30 END"]);
    enter(&mut s, "RUN");
    assert_eq!(exec(&mut s), "? ");
    assert_eq!(s.status, Status::NeedLine);
    enter(&mut s, "3");
    assert_eq!(exec(&mut s), "? ");
    enter(&mut s, "4");
    assert_eq!(exec(&mut s), "7\n");
}

#[test]
fn test_input_list_on_one_line() {
    let mut s = session();
    type_program(&mut s, &["10 INPUT A,B", "20 PRINT A+B", "30 END"]);
    enter(&mut s, "RUN");
    assert_eq!(exec(&mut s), "? ");
    enter(&mut s, "3,4");
    assert_eq!(exec(&mut s), "7\n");
}

#[test]
fn test_input_resumes_after_partial_line() {
    let mut s = session();
    type_program(&mut s, &["10 INPUT A", "20 PRINT A", "30 END"]);
    enter(&mut s, "RUN");
    assert_eq!(exec(&mut s), "? ");
    s.runtime.console_mut().input.extend("4".chars());
    assert_eq!(exec(&mut s), "");
    assert_eq!(s.status, Status::NeedLine);
    enter(&mut s, "2");
    assert_eq!(exec(&mut s), "42\n");
}

#[test]
fn test_list() {
    let mut s = session();
    type_program(&mut s, &["30 PRINT 3", "10 PRINT 1", "20 PRINT 2"]);
    enter(&mut s, "LIST");
    assert_eq!(exec(&mut s), "10 PRINT 1\n20 PRINT 2\n30 PRINT 3\n\n");
    enter(&mut s, "LIST 20");
    assert_eq!(exec(&mut s), "20 PRINT 2\n\n");
    enter(&mut s, "LIST 10,20");
    assert_eq!(exec(&mut s), "10 PRINT 1\n20 PRINT 2\n\n");
}

#[test]
fn test_bare_line_number_deletes() {
    let mut s = session();
    type_program(&mut s, &["10 PRINT 1", "20 PRINT 2"]);
    enter(&mut s, "10");
    enter(&mut s, "LIST");
    assert_eq!(exec(&mut s), ":20 PRINT 2\n\n");
}

#[test]
fn test_clear_empties_program() {
    let mut s = session();
    type_program(&mut s, &["10 PRINT 1", "20 PRINT 2"]);
    enter(&mut s, "CLEAR");
    enter(&mut s, "LIST");
    assert_eq!(exec(&mut s), ":\n");
    assert!(s.runtime.program_lines().is_empty());
}

#[test]
fn test_multiple_statements_need_separate_lines() {
    let mut s = session();
    enter(&mut s, "PRINT 1:PRINT 2");
    assert_eq!(exec(&mut s), "1\nTiny Basic error #73\n");
    assert_eq!(s.runtime.last_error().unwrap().code(), ErrorCode::SyntaxError);
}

#[test]
fn test_rem() {
    let mut s = session();
    type_program(&mut s, &["10 REM NOTHING HERE", "20 END"]);
    enter(&mut s, "RUN");
    assert_eq!(exec(&mut s), "");
    assert_eq!(s.status, Status::NeedLine);
}

#[test]
fn test_goto_undefined_line_then_recover() {
    let mut s = session();
    enter(&mut s, "GOTO 99");
    assert_eq!(exec(&mut s), "\nTiny Basic error #37 at line 99\n");
    let err = s.runtime.last_error().unwrap();
    assert_eq!(err.code(), ErrorCode::UndefinedLine);
    assert_eq!(err.line_number(), Some(99));
    enter(&mut s, "PRINT 7");
    assert_eq!(exec(&mut s), "7\n");
}

#[test]
fn test_running_off_the_end() {
    let mut s = session();
    type_program(&mut s, &[r#"10 PRINT "HI""#]);
    enter(&mut s, "RUN");
    assert_eq!(exec(&mut s), "HI\n\nTiny Basic error #75\n");
    let err = s.runtime.last_error().unwrap();
    assert_eq!(err.code(), ErrorCode::UndefinedLine);
    assert_eq!(err.line_number(), None);
}

#[test]
fn test_run_empty_program() {
    let mut s = session();
    enter(&mut s, "RUN");
    exec(&mut s);
    assert_eq!(
        s.runtime.last_error().unwrap().code(),
        ErrorCode::UndefinedLine
    );
}

#[test]
fn test_return_without_gosub() {
    let mut s = session();
    enter(&mut s, "RETURN");
    assert_eq!(exec(&mut s), "\nTiny Basic error #133\n");
    assert_eq!(
        s.runtime.last_error().unwrap().code(),
        ErrorCode::StackUnderflow
    );
}

#[test]
fn test_unknown_statement() {
    let mut s = session();
    enter(&mut s, "HELLO");
    assert_eq!(exec(&mut s), "\nTiny Basic error #186\n");
    assert_eq!(s.runtime.last_error().unwrap().code(), ErrorCode::SyntaxError);
}

#[test]
fn test_unterminated_string() {
    let mut s = session();
    enter(&mut s, r#"PRINT "OPEN"#);
    assert_eq!(exec(&mut s), "OPEN\nTiny Basic error #62\n");
    assert_eq!(
        s.runtime.last_error().unwrap().code(),
        ErrorCode::UnterminatedString
    );
}

#[test]
fn test_line_zero_is_refused() {
    let mut s = session();
    enter(&mut s, "0 PRINT");
    assert_eq!(exec(&mut s), "\nTiny Basic error #9\n");
    assert_eq!(
        s.runtime.last_error().unwrap().code(),
        ErrorCode::BadLineNumber
    );
}

#[test]
fn test_blank_line_prompts_again() {
    let mut s = session();
    enter(&mut s, "  ");
    assert_eq!(exec(&mut s), "");
    assert_eq!(s.status, Status::NeedLine);
}
