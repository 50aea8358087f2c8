use crate::core::advisor::{Advisor, CannedAdvisor, FALLBACK_QUESTIONS, Predicate, fallback_question};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn rule_for(advisor: &CannedAdvisor, prompt: &str) -> Option<&'static str> {
    advisor.matching_rule(prompt).map(|rule| rule.name)
}

#[test]
fn test_greetings_and_small_talk() {
    let advisor = CannedAdvisor::financial();
    assert_eq!(rule_for(&advisor, ""), Some("empty"));
    assert_eq!(rule_for(&advisor, "   "), Some("empty"));
    assert_eq!(rule_for(&advisor, "Hi there"), Some("greeting"));
    assert_eq!(rule_for(&advisor, "HELLO"), Some("greeting"));
    assert_eq!(rule_for(&advisor, "Thanks a lot!"), Some("thanks"));
    assert_eq!(rule_for(&advisor, "ty"), Some("thanks"));
    assert_eq!(rule_for(&advisor, "how r u"), Some("how_are_you"));
    assert_eq!(rule_for(&advisor, "ok bye"), Some("goodbye"));
}

#[test]
fn test_greeting_needs_a_whole_leading_word() {
    let advisor = CannedAdvisor::financial();
    // "history" starts with "hi" but is not a greeting.
    assert_ne!(rule_for(&advisor, "history of the stock market"), Some("greeting"));
    assert_eq!(rule_for(&advisor, "history of the stock market"), Some("stocks"));
}

#[test]
fn test_first_matching_rule_wins() {
    let advisor = CannedAdvisor::financial();
    assert_eq!(rule_for(&advisor, "Show my transactions"), Some("personal_transactions"));
    assert_eq!(rule_for(&advisor, "my budget for stocks"), Some("personal_budget"));
    assert_eq!(rule_for(&advisor, "my portfolio is down"), Some("personal_investments"));
    assert_eq!(rule_for(&advisor, "What are low cost funds?"), Some("explain_low_cost_funds"));
    assert_eq!(rule_for(&advisor, "stocks"), Some("explain_stocks"));
    assert_eq!(rule_for(&advisor, "tell me about the stock market"), Some("stocks"));
    assert_eq!(rule_for(&advisor, "when can I retire?"), Some("retirement"));
    assert_eq!(rule_for(&advisor, "how do I pay off a loan"), Some("debt"));
}

#[test]
fn test_unmatched_prompt_uses_general_tips() {
    let advisor = CannedAdvisor::financial();
    assert!(advisor.matching_rule("tell me a joke").is_none());

    let candidates = advisor.candidates("tell me a joke");
    assert_eq!(candidates.len(), 3);
    let reply = advisor.advise("tell me a joke");
    assert!(candidates.contains(&reply.as_str()));
}

#[test]
fn test_reply_comes_from_matching_rule() {
    let advisor = CannedAdvisor::financial();
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(
        advisor.respond_with("hello", &mut rng),
        "Hello! I'm your financial advisor bot. How can I help with your financial questions today?"
    );
    assert_eq!(
        advisor.respond_with("", &mut rng),
        "Is there something specific about personal finance you'd like to know?"
    );
    for _ in 0..10 {
        let reply = advisor.respond_with("what is an ira", &mut rng);
        assert!(advisor.candidates("what is an ira").contains(&reply.as_str()));
    }
}

#[test]
fn test_ledger_assistant_rules() {
    let advisor = CannedAdvisor::ledger_assistant();
    assert_eq!(rule_for(&advisor, "How much do I owe?"), Some("amount_owed"));
    assert_eq!(rule_for(&advisor, "what was my last transaction"), Some("recent_transaction"));
    assert_eq!(rule_for(&advisor, "help"), Some("help"));
    assert!(advisor.matching_rule("what's the weather").is_none());
    assert!(advisor.advise("what's the weather").starts_with("I'm your financial assistant"));
}

#[test]
fn test_predicates() {
    assert!(Predicate::ContainsAll(&["how much", "owe"]).matches("how much do i owe"));
    assert!(!Predicate::ContainsAll(&["how much", "owe"]).matches("how much is it"));
    assert!(Predicate::LeadingWord(&["hey"]).matches("hey"));
    assert!(!Predicate::LeadingWord(&["hey"]).matches("heyo"));
    assert!(Predicate::EqualsAny(&["ty"]).matches("ty"));
    assert!(!Predicate::EqualsAny(&["ty"]).matches("typical"));
}

#[test]
fn test_fallback_question_is_a_stock_question() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..10 {
        assert!(FALLBACK_QUESTIONS.contains(&fallback_question(&mut rng)));
    }
}

#[test]
fn test_advisor_tables_by_name() {
    let ledger = CannedAdvisor::by_name(" Ledger ").unwrap();
    assert_eq!(rule_for(&ledger, "how much do i owe"), Some("amount_owed"));
    let financial = CannedAdvisor::by_name("financial").unwrap();
    assert_eq!(rule_for(&financial, "hello"), Some("greeting"));
    assert!(CannedAdvisor::by_name("astrology").is_none());
}
