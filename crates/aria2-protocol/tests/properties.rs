use aria2_protocol::{qualify_method, token_param, Request, PRIMARY_NAMESPACE, SYSTEM_NAMESPACE};
use proptest::prelude::*;
use serde_json::{json, Value};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_qualified_name_has_exactly_one_namespace(name in "[a-zA-Z][a-zA-Z0-9]{0,24}") {
        let short = qualify_method(&name).into_owned();
        let already = qualify_method(&format!("{PRIMARY_NAMESPACE}{name}")).into_owned();

        prop_assert_eq!(&short, &format!("{PRIMARY_NAMESPACE}{name}"));
        prop_assert_eq!(&short, &already);
        prop_assert!(!short.starts_with("aria2.aria2."));
    }

    #[test]
    fn prop_system_names_pass_through(name in "[a-zA-Z]{1,24}") {
        let full = format!("{SYSTEM_NAMESPACE}{name}");
        prop_assert_eq!(qualify_method(&full), full.as_str());
    }

    #[test]
    fn prop_token_leads_caller_params(
        secret in "[a-zA-Z0-9]{1,16}",
        args in prop::collection::vec("[a-z]{0,8}", 0..6)
    ) {
        let mut params: Vec<Value> = token_param(&secret).into_iter().collect();
        params.extend(args.iter().map(|a| json!(a)));

        let req = Request::new(0, "aria2.addUri", params);
        let wire: Value = serde_json::from_str(&req.to_json().unwrap()).unwrap();
        let sent = wire["params"].as_array().unwrap();

        prop_assert_eq!(&sent[0], &json!(format!("token:{secret}")));
        prop_assert_eq!(sent.len(), args.len() + 1);
        for (sent, arg) in sent[1..].iter().zip(&args) {
            prop_assert_eq!(sent, &json!(arg));
        }
    }

    #[test]
    fn prop_params_member_absent_iff_empty(args in prop::collection::vec("[a-z]{1,8}", 0..4)) {
        let params: Vec<Value> = args.iter().map(|a| json!(a)).collect();
        let req = Request::new(1, "aria2.tellActive", params);
        let wire: Value = serde_json::from_str(&req.to_json().unwrap()).unwrap();

        prop_assert_eq!(wire.get("params").is_none(), args.is_empty());
    }
}
