#[cfg(test)]
mod header {
    use crate::header::names::TEST_HEADERS;
    use crate::{header::HeaderKind, HeaderName, HeaderValue};

    #[test]
    fn parse_standard_headers() {
        for &(std_header, lowercase) in TEST_HEADERS {
            let uppercase = lowercase.to_ascii_uppercase();
            let from_lowercase = HeaderName::try_from(lowercase);
            let from_uppercase = HeaderName::try_from(uppercase.as_slice());
            assert_eq!(Ok(HeaderName::from(std_header)), from_lowercase);
            assert_eq!(Ok(HeaderName::from(std_header)), from_uppercase);
        }
    }

    #[test]
    fn parse_custom_headers() {
        macro_rules! test_custom_headers {
            ( $($name:expr => $val:expr;)+ ) =>  {{
                $(
                    let test_name = HeaderName::try_from($name).unwrap();
                    let exp_kind = HeaderKind::Custom($name.to_owned());
                    let exp_name = HeaderName { inner: exp_kind };
                    assert_eq!(test_name, exp_name);
                )+

                $(
                    let test_val = HeaderValue::from($val);
                    let exp_val = HeaderValue($val.to_owned());
                    assert_eq!(test_val, exp_val);
                )+
            }};
        }

        test_custom_headers! {
            Vec::from("cats").as_slice()  => Vec::from("dogs").as_slice();
            Vec::from("sun").as_slice()   => Vec::from("moon").as_slice();
            Vec::from("black").as_slice() => Vec::from("white").as_slice();
            Vec::from("hot").as_slice()   => Vec::from("cold").as_slice();
            Vec::from("tired").as_slice() => Vec::from("awake").as_slice();
        }
    }
}

#[cfg(test)]
mod http {
    use std::str::FromStr;
    use crate::{Method, Status, Version};

    #[test]
    fn parse_method() {
        let get = "GET".parse::<Method>();
        let head = "HEAD".parse::<Method>();
        let post = "POST".parse::<Method>();
        let put = "PUT".parse::<Method>();
        let patch = "PATCH".parse::<Method>();
        let delete = "DELETE".parse::<Method>();
        let trace = "TRACE".parse::<Method>();
        let options = "OPTIONS".parse::<Method>();
        let connect = "CONNECT".parse::<Method>();
        let bad_get = "get".parse::<Method>();
        let unknown = "FOO".parse::<Method>();

        assert_eq!(get, Ok(Method::Get));
        assert_eq!(head, Ok(Method::Head));
        assert_eq!(post, Ok(Method::Post));
        assert_eq!(put, Ok(Method::Put));
        assert_eq!(patch, Ok(Method::Patch));
        assert_eq!(delete, Ok(Method::Delete));
        assert_eq!(trace, Ok(Method::Trace));
        assert_eq!(options, Ok(Method::Options));
        assert_eq!(connect, Ok(Method::Connect));
        assert!(bad_get.is_err());
        assert!(unknown.is_err());
    }

    #[test]
    fn parse_status() {
        let s100 = "100";
        let s201 = "201";
        let s301 = "301";
        let s403 = "403";
        let s500 = "500";
        let bad = "abc";

        assert_eq!(s100.parse::<Status>(), Ok(Status(100)));
        assert_eq!(s201.parse::<Status>(), Ok(Status(201)));
        assert_eq!(s301.parse::<Status>(), Ok(Status(301)));
        assert_eq!(s403.parse::<Status>(), Ok(Status(403)));
        assert_eq!(s500.parse::<Status>(), Ok(Status(500)));
        assert!(bad.parse::<Status>().is_err());
    }

    #[test]
    fn parse_version() {
        let v0_9 = Version::from_str("HTTP/0.9");
        let v1_0 = Version::from_str("HTTP/1.0");
        let v1_1 = Version::from_str("HTTP/1.1");
        let v2_0 = Version::from_str("HTTP/2.0");
        let v3_0 = Version::from_str("HTTP/3.0");
        let bad = Version::from_str("HTTP/1.2");

        assert_eq!(v0_9, Ok(Version::ZeroDotNine));
        assert_eq!(v1_0, Ok(Version::OneDotZero));
        assert_eq!(v1_1, Ok(Version::OneDotOne));
        assert_eq!(v2_0, Ok(Version::TwoDotZero));
        assert_eq!(v3_0, Ok(Version::ThreeDotZero));
        assert!(bad.is_err());
    }
}

#[cfg(test)]
mod utils {
    use crate::trim_whitespace_bytes;

    #[test]
    fn trim_whitespace() {
        assert_eq!(trim_whitespace_bytes(b"  test"), b"test");
        assert_eq!(trim_whitespace_bytes(b"test    "), b"test");
        assert_eq!(trim_whitespace_bytes(b"         test       "), b"test");
        assert_eq!(
            trim_whitespace_bytes(b"  Hello \nworld       "),
            b"Hello \nworld"
        );
        assert_eq!(trim_whitespace_bytes(b"\t  \nx\t  x\r\x0c"), b"x\t  x");
        assert_eq!(trim_whitespace_bytes(b"                   "), b"");
        assert_eq!(trim_whitespace_bytes(b" "), b"");
        assert_eq!(trim_whitespace_bytes(b"x"), b"x");
        assert_eq!(trim_whitespace_bytes(b""), b"");
    }
}
