//! Canned advice. Replies come from an ordered table of (predicate, response
//! set) rules; the first rule whose predicate matches the lowercased, trimmed
//! prompt wins and one of its responses is picked at random.

use rand::Rng;
use rand::seq::IndexedRandom;

pub trait Advisor: Send + Sync {
    fn advise(&self, text: &str) -> String;
}

#[derive(Clone, Debug)]
pub enum Predicate {
    Blank,
    ContainsAny(&'static [&'static str]),
    ContainsAll(&'static [&'static str]),
    EqualsAny(&'static [&'static str]),
    /// The prompt is one of the words, or starts with one followed by a space.
    LeadingWord(&'static [&'static str]),
    AnyOf(Vec<Predicate>),
}

impl Predicate {
    pub fn matches(&self, prompt: &str) -> bool {
        match self {
            Predicate::Blank => prompt.is_empty(),
            Predicate::ContainsAny(words) => words.iter().any(|w| prompt.contains(w)),
            Predicate::ContainsAll(words) => words.iter().all(|w| prompt.contains(w)),
            Predicate::EqualsAny(words) => words.iter().any(|w| prompt == *w),
            Predicate::LeadingWord(words) => words
                .iter()
                .any(|w| prompt == *w || prompt.strip_prefix(w).is_some_and(|rest| rest.starts_with(' '))),
            Predicate::AnyOf(predicates) => predicates.iter().any(|p| p.matches(prompt)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub name: &'static str,
    pub predicate: Predicate,
    pub responses: &'static [&'static str],
}

impl Rule {
    fn new(name: &'static str, predicate: Predicate, responses: &'static [&'static str]) -> Self {
        Rule {
            name,
            predicate,
            responses,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CannedAdvisor {
    rules: Vec<Rule>,
    fallback: &'static [&'static str],
}

pub fn normalize(prompt: &str) -> String {
    prompt.trim().to_lowercase()
}

impl CannedAdvisor {
    pub fn new(rules: Vec<Rule>, fallback: &'static [&'static str]) -> Self {
        CannedAdvisor { rules, fallback }
    }

    pub fn matching_rule(&self, prompt: &str) -> Option<&Rule> {
        let prompt = normalize(prompt);
        self.rules.iter().find(|rule| rule.predicate.matches(&prompt))
    }

    /// Candidate replies for `prompt`: the first matching rule's set, or the fallback set.
    pub fn candidates(&self, prompt: &str) -> &'static [&'static str] {
        self.matching_rule(prompt)
            .map(|rule| rule.responses)
            .unwrap_or(self.fallback)
    }

    pub fn respond_with<R: Rng + ?Sized>(&self, prompt: &str, rng: &mut R) -> String {
        self.candidates(prompt)
            .choose(rng)
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    /// Looks up a built-in table: `financial` or `ledger`.
    pub fn by_name(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "financial" => Some(Self::financial()),
            "ledger" | "ledger-assistant" => Some(Self::ledger_assistant()),
            _ => None,
        }
    }

    /// General personal-finance advisor.
    pub fn financial() -> Self {
        use Predicate::*;
        let rules = vec![
            Rule::new("empty", Blank, EMPTY_PROMPT),
            Rule::new(
                "personal_transactions",
                ContainsAny(&[
                    "my transactions",
                    "my recent transactions",
                    "my spending",
                    "what did i spend",
                    "transaction history",
                ]),
                PERSONAL_TRANSACTIONS,
            ),
            Rule::new(
                "personal_balance",
                ContainsAny(&["my balance", "my account balance", "how much money", "my savings"]),
                PERSONAL_BALANCE,
            ),
            Rule::new(
                "personal_budget",
                ContainsAny(&["my budget", "my spending plan", "my financial plan"]),
                PERSONAL_BUDGET,
            ),
            Rule::new(
                "personal_investments",
                ContainsAny(&["my investments", "my portfolio", "my stocks", "my 401k"]),
                PERSONAL_INVESTMENTS,
            ),
            Rule::new(
                "greeting",
                LeadingWord(&[
                    "hi",
                    "hello",
                    "hey",
                    "good morning",
                    "good afternoon",
                    "good evening",
                    "howdy",
                    "sup",
                    "what's up",
                    "greetings",
                ]),
                GREETING,
            ),
            Rule::new(
                "thanks",
                AnyOf(vec![ContainsAny(&["thank", "thanks"]), EqualsAny(&["ty"])]),
                THANKS,
            ),
            Rule::new(
                "how_are_you",
                AnyOf(vec![ContainsAny(&["how are you"]), EqualsAny(&["how r u", "how r you"])]),
                HOW_ARE_YOU,
            ),
            Rule::new(
                "goodbye",
                AnyOf(vec![ContainsAny(&["bye", "goodbye"]), EqualsAny(&["see ya", "cya"])]),
                GOODBYE,
            ),
            Rule::new(
                "explain_low_cost_funds",
                ContainsAny(&[
                    "what do you mean by low cost funds",
                    "what are low cost funds",
                    "low cost funds",
                ]),
                EXPLAIN_LOW_COST_FUNDS,
            ),
            Rule::new(
                "explain_where_to_invest",
                ContainsAny(&["where do i invest", "where should i invest", "where to invest"]),
                EXPLAIN_WHERE_TO_INVEST,
            ),
            Rule::new(
                "explain_stocks",
                AnyOf(vec![
                    ContainsAny(&[
                        "teach me about stocks",
                        "learn about stocks",
                        "stock investing",
                        "can you teach me about stocks",
                    ]),
                    EqualsAny(&["stocks"]),
                ]),
                EXPLAIN_STOCKS,
            ),
            Rule::new(
                "lowcostfunds",
                ContainsAny(&["low cost fund", "low-cost fund", "index fund fee", "expense ratio", "low fee"]),
                TOPIC_LOW_COST_FUNDS,
            ),
            Rule::new(
                "wheretoinvest",
                ContainsAny(&[
                    "where to invest",
                    "where should i invest",
                    "best place to invest",
                    "investment platform",
                    "brokerage",
                ]),
                TOPIC_WHERE_TO_INVEST,
            ),
            Rule::new(
                "stocks",
                ContainsAny(&["stock", "equity", "shares", "market", "trading"]),
                TOPIC_STOCKS,
            ),
            Rule::new(
                "multiplestreams",
                ContainsAny(&["multiple stream", "different income", "side hustle", "passive income"]),
                TOPIC_MULTIPLE_STREAMS,
            ),
            Rule::new(
                "retirement",
                ContainsAny(&["retire", "401k", "ira", "pension", "social security"]),
                TOPIC_RETIREMENT,
            ),
            Rule::new(
                "credit",
                ContainsAny(&[
                    "credit score",
                    "fico",
                    "credit card",
                    "credit report",
                    "credit history",
                    "improve credit",
                ]),
                TOPIC_CREDIT,
            ),
            Rule::new(
                "budget",
                ContainsAny(&["budget", "save", "saving", "expense", "spending", "track money"]),
                TOPIC_BUDGET,
            ),
            Rule::new(
                "debt",
                ContainsAny(&["debt", "loan", "mortgage", "credit card", "interest rate", "pay off"]),
                TOPIC_DEBT,
            ),
            Rule::new(
                "investing",
                ContainsAny(&["invest", "return", "portfolio", "asset", "fund", "etf", "roth"]),
                TOPIC_INVESTING,
            ),
            Rule::new(
                "housing",
                ContainsAny(&[
                    "house",
                    "apartment",
                    "rent",
                    "mortgage",
                    "property",
                    "real estate",
                    "buy home",
                ]),
                TOPIC_HOUSING,
            ),
        ];
        CannedAdvisor::new(rules, TOPIC_GENERAL)
    }

    /// In-app assistant that answers questions about the user's own ledger.
    pub fn ledger_assistant() -> Self {
        use Predicate::*;
        let rules = vec![
            Rule::new(
                "recent_transaction",
                ContainsAny(&["recent transaction", "last transaction"]),
                &["Your most recent transaction was 'Dinner at Italian Restaurant' for $45.00 on April 2nd, 2025. You split this with Alex and Maria."],
            ),
            Rule::new(
                "amount_owed",
                ContainsAll(&["how much", "owe"]),
                &["Based on your current transactions, you owe a total of $125.50 to various friends. The largest amount is $75.00 that you owe to Michael for the concert tickets."],
            ),
            Rule::new(
                "budget",
                ContainsAny(&["budget", "saving"]),
                &["Looking at your spending patterns, I notice you spend about 35% on food, 25% on entertainment, and 15% on transportation. To improve your savings, you might want to consider reducing restaurant expenses which make up about 20% of your total spending."],
            ),
            Rule::new(
                "help",
                ContainsAny(&["help", "how do i"]),
                &["I can help you with: checking your balances, reviewing recent transactions, analyzing spending patterns, or providing financial tips. Just ask me something specific about your transactions or expenses!"],
            ),
        ];
        CannedAdvisor::new(
            rules,
            &["I'm your financial assistant for this expense sharing app. I can help you track expenses, analyze your spending, and manage shared costs with friends. What would you like to know about your transactions?"],
        )
    }
}

impl Advisor for CannedAdvisor {
    fn advise(&self, text: &str) -> String {
        self.respond_with(text, &mut rand::rng())
    }
}

/// Questions substituted for a voice message that could not be transcribed.
pub const FALLBACK_QUESTIONS: &[&str] = &[
    "How can I improve my credit score?",
    "What's the best way to invest for retirement?",
    "Should I pay off debt or invest first?",
    "How do I create a budget?",
    "What are the tax benefits of a 401k?",
];

pub fn fallback_question<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    FALLBACK_QUESTIONS.choose(rng).copied().unwrap_or(FALLBACK_QUESTIONS[0])
}

const EMPTY_PROMPT: &[&str] = &["Is there something specific about personal finance you'd like to know?"];

const PERSONAL_TRANSACTIONS: &[&str] = &[
    "I don't have access to your personal transaction data in this demo. In a real financial advisor app, I would connect to your bank accounts securely and show your recent transactions here. Would you like advice on how to track your transactions effectively?",
];

const PERSONAL_BALANCE: &[&str] = &[
    "I don't have access to your account balances in this demo version. In a full implementation, I would securely connect to your financial institutions to provide real-time balance information. Would you like some advice on managing account balances instead?",
];

const PERSONAL_BUDGET: &[&str] = &[
    "I don't have access to your personal budget information in this demo. In a complete app, I would display your budget categories and spending patterns. Would you like advice on creating an effective budget?",
];

const PERSONAL_INVESTMENTS: &[&str] = &[
    "I don't have access to your investment portfolio in this demo. In a full version, I would show your current investments, performance, and allocation. Would you like general advice about investment strategies instead?",
];

const GREETING: &[&str] = &["Hello! I'm your financial advisor bot. How can I help with your financial questions today?"];

const THANKS: &[&str] = &["You're welcome! Is there anything else I can help you with regarding your finances?"];

const HOW_ARE_YOU: &[&str] = &[
    "I'm functioning well, thank you! I'm here to help with your financial questions. What would you like to know?",
];

const GOODBYE: &[&str] = &["Goodbye! Feel free to return if you have more financial questions in the future."];

const EXPLAIN_LOW_COST_FUNDS: &[&str] = &[
    "Low-cost funds refer to investment vehicles with minimal expense ratios (typically below 0.2%) that track market indices rather than trying to beat the market through active management. They save investors money by charging less in fees, allowing more of your money to remain invested and grow over time.",
];

const EXPLAIN_WHERE_TO_INVEST: &[&str] = &[
    "For most investors, brokerages like Vanguard, Fidelity, or Charles Schwab offer excellent low-cost investment options with minimal fees. When deciding where to invest, prioritize tax-advantaged accounts like 401(k)s, IRAs, and HSAs before using taxable brokerage accounts. Look for platforms that offer commission-free trading and access to low-cost index funds.",
];

const EXPLAIN_STOCKS: &[&str] = &[
    "Stocks represent ownership in a company. When investing in stocks, financial experts recommend starting with broad-based, low-cost index funds that track the entire market before picking individual stocks. This provides instant diversification. Consider dollar-cost averaging (investing a fixed amount regularly) to reduce timing risk, and focus on long-term growth rather than short-term market movements.",
];

const TOPIC_BUDGET: &[&str] = &[
    "Based on best practices in personal finance, I recommend using the 50/30/20 rule for budgeting: 50% for needs, 30% for wants, and 20% for savings and debt repayment.",
    "Financial experts suggest zero-based budgeting, where you assign every dollar a purpose at the beginning of the month.",
    "According to financial advisors, automating your savings with scheduled transfers to a separate account on payday is one of the most effective ways to build savings.",
];

const TOPIC_DEBT: &[&str] = &[
    "Financial analysts generally recommend the debt avalanche method: paying off high-interest debt first while making minimum payments on other debts.",
    "According to research, the debt snowball method (paying off smallest debts first) can provide psychological wins that keep you motivated.",
    "Many financial institutions offer options to consolidate high-interest debts into a lower-interest loan or 0% APR balance transfer credit card, which could save you significant money on interest.",
];

const TOPIC_STOCKS: &[&str] = &[
    "When investing in stocks, financial experts recommend starting with low-cost index funds that track the broader market, like S&P 500 index funds.",
    "Stocks historically have returned around 10% annually before inflation, though past performance doesn't guarantee future results.",
    "For stock investing, consider dollar-cost averaging (investing a fixed amount regularly regardless of market conditions) to reduce timing risk.",
];

const TOPIC_INVESTING: &[&str] = &[
    "Investment professionals emphasize that starting retirement investments early is crucial due to the power of compound interest.",
    "According to Vanguard research, low-cost index funds typically outperform actively managed funds over the long term due to lower fees.",
    "Financial planners generally recommend investing 15-20% of your income for retirement through tax-advantaged accounts like 401(k)s and IRAs.",
];

const TOPIC_RETIREMENT: &[&str] = &[
    "For retirement planning, most financial advisors recommend saving at least 15% of your pre-tax income annually.",
    "The 4% rule suggests that retirees can withdraw 4% of their retirement savings in the first year, then adjust for inflation each year, with a high probability of not running out of money for at least 30 years.",
    "When planning for retirement, consider tax-advantaged accounts in this priority: first max out employer 401(k) match, then max out HSA if eligible, then max out IRA or Roth IRA, then contribute more to 401(k).",
];

const TOPIC_LOW_COST_FUNDS: &[&str] = &[
    "Low-cost index funds typically have expense ratios below 0.2%, compared to 1-2% for actively managed funds, which can save you tens of thousands of dollars over your investing lifetime.",
    "Low-cost funds refer to investment vehicles with minimal expense ratios that track market indices rather than trying to beat the market through active management.",
    "Low-cost index funds provide broad diversification by investing in hundreds or thousands of companies through a single fund, reducing the risk associated with individual stocks.",
];

const TOPIC_HOUSING: &[&str] = &[
    "According to housing affordability guidelines, you should aim to spend no more than 28% of your gross monthly income on housing costs.",
    "Mortgage experts recommend a 20% down payment when buying a home to avoid private mortgage insurance (PMI) and secure better interest rates.",
    "Financial analysts suggest that refinancing can be beneficial when interest rates drop at least 1% lower than your current rate.",
];

const TOPIC_CREDIT: &[&str] = &[
    "To improve your credit score, focus on paying bills on time (35% of your score), keeping credit utilization below 30% (30% of your score), and maintaining a long credit history (15% of your score).",
    "Credit bureaus recommend checking your credit report annually for errors, as studies show that 1 in 4 reports contain errors that could affect your score.",
    "Building good credit involves making on-time payments, keeping old accounts open to establish credit history, and limiting applications for new credit to avoid hard inquiries.",
];

const TOPIC_WHERE_TO_INVEST: &[&str] = &[
    "For most investors, brokerages like Vanguard, Fidelity, or Charles Schwab offer excellent low-cost investment options with minimal fees.",
    "When deciding where to invest, prioritize tax-advantaged accounts like 401(k)s, IRAs, HSAs, and 529 plans before using taxable brokerage accounts.",
    "Investment advisors recommend online brokerages with low trading fees, no account minimums, and access to low-cost index funds and ETFs for beginning investors.",
];

const TOPIC_MULTIPLE_STREAMS: &[&str] = &[
    "Research shows that building multiple streams of income is one of the most effective strategies for achieving financial independence.",
    "Financial experts suggest developing at least 3-7 income streams across different categories: active income (job), portfolio income (investments), passive income (real estate, businesses), and royalty income (content creation).",
    "Creating multiple income streams provides financial resilience by ensuring that if one source decreases or disappears, you have others to rely on.",
];

const TOPIC_GENERAL: &[&str] = &[
    "According to financial advisors, reviewing your subscriptions regularly and canceling unused services can save the average household over $500 annually.",
    "Research shows that building multiple streams of income is one of the most effective strategies for achieving financial independence.",
    "Financial experts recommend maintaining an emergency fund of 3-6 months of living expenses in a high-yield savings account for financial security.",
];
