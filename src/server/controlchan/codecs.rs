use super::{
    error::{ControlChanError, ControlChanErrorKind},
    reply::{Reply, ReplyCode, ReplyLine},
};

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

// Longest command line accepted, line ending excluded.
const MAX_LINE_LENGTH: usize = 8192;

// FtpCodec implements tokio's `Decoder` and `Encoder` traits for the control channel. Decoding
// yields raw lines, without the line ending; turning them into text is up to the session because
// the encoding can be switched with OPTS UTF8.
#[derive(Debug, Default)]
pub(crate) struct FtpCodec {
    // Stored index of the next index to examine for a '\n' character. This is used to optimize
    // searching. For example, if `decode` was called with `abc`, it would hold `3`, because that
    // is the next index to examine. The next time `decode` is called with `abcde\n`, we will only
    // look at `de\n` before returning.
    next_index: usize,
}

impl FtpCodec {
    pub(crate) fn new() -> Self {
        FtpCodec { next_index: 0 }
    }

    // Drops the buffered input. The caller ends the session since the stream can't recover.
    fn overflow(&mut self, buf: &mut BytesMut) -> ControlChanError {
        buf.clear();
        self.next_index = 0;
        ControlChanErrorKind::LineTooLong.into()
    }
}

impl Decoder for FtpCodec {
    type Item = BytesMut;
    type Error = ControlChanError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<BytesMut>, Self::Error> {
        if let Some(newline_offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let newline_index = newline_offset + self.next_index;
            let carriage_return = newline_index > 0 && buf[newline_index - 1] == b'\r';
            if newline_index - usize::from(carriage_return) > MAX_LINE_LENGTH {
                return Err(self.overflow(buf));
            }
            let mut line = buf.split_to(newline_index + 1);
            self.next_index = 0;
            line.truncate(newline_index);
            if line.last() == Some(&b'\r') {
                line.truncate(newline_index - 1);
            }
            Ok(Some(line))
        } else if buf.len() > MAX_LINE_LENGTH + 1 {
            Err(self.overflow(buf))
        } else {
            self.next_index = buf.len();
            Ok(None)
        }
    }
}

fn put_line(buf: &mut BytesMut, code: ReplyCode, separator: char, text: &str) {
    let text = if text.is_empty() { code.default_message() } else { text };
    buf.put_slice(format!("{}{}{}\r\n", code as u32, separator, text).as_bytes());
}

impl Encoder<Reply> for FtpCodec {
    type Error = ControlChanError;

    // Single line replies are `CODE text`. Multi-line replies put `CODE-` in front of every text
    // line but the last, which gets `CODE ` so the client knows the reply ended. Raw lines go out
    // as they are.
    fn encode(&mut self, reply: Reply, buf: &mut BytesMut) -> Result<(), Self::Error> {
        match reply {
            Reply::None => {}
            Reply::CodeAndMsg { code, msg } => put_line(buf, code, ' ', &msg),
            Reply::MultiLine { code, lines } => {
                if lines.is_empty() {
                    put_line(buf, code, ' ', "");
                }
                let last = lines.len().saturating_sub(1);
                for (i, line) in lines.iter().enumerate() {
                    match line {
                        ReplyLine::Raw(text) => {
                            buf.put_slice(text.as_bytes());
                            buf.put_slice(b"\r\n");
                        }
                        ReplyLine::Text(text) => put_line(buf, code, if i == last { ' ' } else { '-' }, text),
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode(reply: Reply) -> String {
        let mut buf = BytesMut::new();
        FtpCodec::new().encode(reply, &mut buf).unwrap();
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn decodes_lines_in_pieces() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from(&b"USER al"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"ice\r\nPWD\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), &b"USER alice"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), &b"PWD"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn refuses_lines_over_the_maximum() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from(vec![b'a'; MAX_LINE_LENGTH].as_slice());
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().len(), MAX_LINE_LENGTH);

        let mut buf = BytesMut::from(vec![b'a'; MAX_LINE_LENGTH + 2].as_slice());
        let err = codec.decode(&mut buf).unwrap_err();
        assert_eq!(err.kind(), &ControlChanErrorKind::LineTooLong);
        assert!(buf.is_empty());

        let mut buf = BytesMut::from(vec![b'a'; MAX_LINE_LENGTH + 1].as_slice());
        buf.extend_from_slice(b"\n");
        assert_eq!(codec.decode(&mut buf).unwrap_err().kind(), &ControlChanErrorKind::LineTooLong);
    }

    #[test]
    fn single_line() {
        assert_eq!(encode(Reply::new(ReplyCode::CommandOkay, "OK")), "200 OK\r\n");
        assert_eq!(encode(Reply::code(ReplyCode::ClosingDataConnection)), "226 Closing data connection. Requested file action successful.\r\n");
        assert_eq!(encode(Reply::none()), "");
    }

    #[test]
    fn multi_line_with_raw_lines() {
        let reply = Reply::new_multiline(
            ReplyCode::SystemStatus,
            vec![
                ReplyLine::from("Extensions supported"),
                ReplyLine::Raw(" EPSV".to_string()),
                ReplyLine::Raw(" UTF8".to_string()),
                ReplyLine::from("End"),
            ],
        );
        assert_eq!(encode(reply), "211-Extensions supported\r\n EPSV\r\n UTF8\r\n211 End\r\n");
    }

    #[test]
    fn multi_line_interior_text_lines_are_continuations() {
        let reply = Reply::new_multiline(ReplyCode::ServiceReady, vec!["Welcome", "to the server", "Ready"]);
        assert_eq!(encode(reply), "220-Welcome\r\n220-to the server\r\n220 Ready\r\n");
    }

    #[test]
    fn multi_line_with_one_line_is_a_single_line() {
        assert_eq!(encode(Reply::new_multiline(ReplyCode::HelpMessage, vec!["only"])), "214 only\r\n");
    }
}
